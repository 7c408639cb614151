//! Checkout orchestrator: runs the eight checkout stages for one request.

use std::future::Future;
use std::time::{Duration, Instant};

use cart_store::{CartStore, CartStoreError};
use common::{OrderId, UserId};
use domain::{
    Address, Cart, CartItem, CreditCardInfo, CurrencyConverter, Money, OrderItem, OrderResult,
    PlaceOrderRequest,
};
use serde::Serialize;
use tracing::Instrument;

use crate::error::{CheckoutError, Result, ServiceError, StageError};
use crate::events::CheckoutEvent;
use crate::journal::OrderJournal;
use crate::record::CheckoutRecord;
use crate::services::{CatalogService, NotificationService, PaymentService, ShippingService};
use crate::stages::{SAGA_TYPE, Stage};

/// Default per-call deadline for collaborators.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Orchestrator tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Deadline applied to every collaborator call. Expiry surfaces as
    /// `ServiceError::Unavailable`.
    pub call_timeout: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Outcome of a successful checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedOrder {
    pub order: OrderResult,
    pub transaction_id: String,
    /// Amount charged, in the user's currency.
    pub total_paid: Money,
    /// Failures of best-effort stages, as `"stage: error"`.
    pub warnings: Vec<String>,
}

/// A cart line with its catalog (USD) price.
struct PricedLine {
    item: CartItem,
    price: Money,
}

/// Runs checkouts.
///
/// Stages run strictly in order and each stage's output feeds the next:
/// fetch cart, price items, quote shipping, convert currency, charge card,
/// ship order, empty cart, notify. Any failure up to and including
/// `ShipOrder` aborts the checkout. A failure after the charge leaves the
/// charge in place; nothing is refunded. An `EmptyCart` failure only adds a
/// warning. The confirmation is sent on a spawned task once the order is
/// complete, so `place_order` never waits for it; its failure is logged and
/// added to the journaled record as a warning.
///
/// Dropping the future returned by [`place_order`](Self::place_order)
/// cancels the checkout between calls; the journal keeps whatever was
/// recorded up to that point.
pub struct OrderOrchestrator<C, K, S, P, N>
where
    C: CartStore,
    K: CatalogService,
    S: ShippingService,
    P: PaymentService,
    N: NotificationService,
{
    cart_store: C,
    catalog: K,
    shipping: S,
    payment: P,
    notifier: N,
    converter: CurrencyConverter,
    journal: OrderJournal,
    config: CheckoutConfig,
}

impl<C, K, S, P, N> OrderOrchestrator<C, K, S, P, N>
where
    C: CartStore,
    K: CatalogService,
    S: ShippingService,
    P: PaymentService,
    N: NotificationService + Clone + 'static,
{
    /// Creates an orchestrator with default configuration and an empty journal.
    pub fn new(
        cart_store: C,
        catalog: K,
        shipping: S,
        payment: P,
        notifier: N,
        converter: CurrencyConverter,
    ) -> Self {
        Self {
            cart_store,
            catalog,
            shipping,
            payment,
            notifier,
            converter,
            journal: OrderJournal::new(),
            config: CheckoutConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CheckoutConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `journal` to record checkouts, sharing it with the caller.
    pub fn with_journal(mut self, journal: OrderJournal) -> Self {
        self.journal = journal;
        self
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    pub fn journal(&self) -> &OrderJournal {
        &self.journal
    }

    pub fn converter(&self) -> &CurrencyConverter {
        &self.converter
    }

    /// Latest record of a checkout started by this orchestrator.
    pub async fn get_order(&self, order_id: OrderId) -> Option<CheckoutRecord> {
        self.journal.get(order_id).await
    }

    /// Places an order for the user's cart.
    #[tracing::instrument(
        skip_all,
        fields(
            saga_type = SAGA_TYPE,
            order_id = tracing::field::Empty,
            user_id = %request.user_id,
            user_currency = %request.user_currency,
        )
    )]
    pub async fn place_order(&self, request: PlaceOrderRequest) -> Result<PlacedOrder> {
        metrics::counter!("checkout_orders_total").increment(1);
        let started = Instant::now();

        let order_id = OrderId::new();
        tracing::Span::current().record("order_id", tracing::field::display(order_id));

        let mut record =
            CheckoutRecord::start(order_id, request.user_id.clone(), &request.user_currency);
        self.journal.save(&record).await;
        tracing::info!("checkout started");

        let result = self.run(&mut record, &request).await;

        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());
        match &result {
            Ok(placed) => {
                metrics::counter!("checkout_orders_completed").increment(1);
                tracing::info!(
                    transaction_id = %placed.transaction_id,
                    tracking_id = %placed.order.shipping_tracking_id,
                    total_paid = %placed.total_paid,
                    warnings = placed.warnings.len(),
                    "checkout completed"
                );
            }
            Err(err) => {
                metrics::counter!("checkout_orders_failed", "stage" => err.stage().as_str())
                    .increment(1);
            }
        }
        result
    }

    async fn run(
        &self,
        record: &mut CheckoutRecord,
        request: &PlaceOrderRequest,
    ) -> Result<PlacedOrder> {
        let currency = request.user_currency.as_str();

        let cart = self
            .run_stage(record, Stage::FetchCart, self.fetch_cart(&request.user_id))
            .await?;

        let priced = self
            .run_stage(record, Stage::PriceItems, self.price_items(&cart))
            .await?;

        let shipping_quote = self
            .run_stage(
                record,
                Stage::QuoteShipping,
                self.quote_shipping(&request.address, &cart.items),
            )
            .await?;

        let (items, shipping_cost) = self
            .run_stage(
                record,
                Stage::ConvertCurrency,
                std::future::ready(self.convert_costs(&priced, &shipping_quote, currency)),
            )
            .await?;

        let (transaction_id, total_paid) = self
            .run_stage(
                record,
                Stage::ChargeCard,
                self.charge_card(&items, &shipping_cost, &request.credit_card),
            )
            .await?;
        self.record(
            record,
            CheckoutEvent::card_charged(&transaction_id, total_paid.clone()),
        )
        .await;

        let tracking_id = self
            .run_stage(
                record,
                Stage::ShipOrder,
                self.ship_order(&request.address, &cart.items),
            )
            .await?;
        self.record(record, CheckoutEvent::order_shipped(&tracking_id))
            .await;

        self.best_effort(record, Stage::EmptyCart, self.empty_cart(&request.user_id))
            .await;

        let order = OrderResult {
            order_id: record.order_id(),
            shipping_tracking_id: tracking_id,
            shipping_cost,
            shipping_address: request.address.clone(),
            items,
        };

        self.record(record, CheckoutEvent::stage_completed(Stage::Notify))
            .await;
        self.record(record, CheckoutEvent::checkout_completed()).await;
        self.dispatch_confirmation(request.email.clone(), order.clone());

        Ok(PlacedOrder {
            order,
            transaction_id,
            total_paid,
            warnings: record.warnings().to_vec(),
        })
    }

    /// Runs a mandatory stage, turning its failure into `OrderFailed`.
    async fn run_stage<T>(
        &self,
        record: &mut CheckoutRecord,
        stage: Stage,
        step: impl Future<Output = std::result::Result<T, StageError>>,
    ) -> Result<T> {
        tracing::debug!(%stage, "checkout stage started");
        match step.await {
            Ok(value) => {
                self.record(record, CheckoutEvent::stage_completed(stage))
                    .await;
                Ok(value)
            }
            Err(source) => {
                let transaction_id = record.transaction_id().map(str::to_string);
                match &transaction_id {
                    Some(transaction_id) => tracing::error!(
                        %stage,
                        %transaction_id,
                        error = %source,
                        "checkout failed after the card was charged"
                    ),
                    None => tracing::warn!(%stage, error = %source, "checkout failed"),
                }
                self.record(record, CheckoutEvent::checkout_failed(stage, &source))
                    .await;
                Err(CheckoutError::OrderFailed {
                    order_id: record.order_id(),
                    stage,
                    transaction_id,
                    source,
                })
            }
        }
    }

    /// Runs a best-effort stage; a failure is recorded as a warning.
    async fn best_effort(
        &self,
        record: &mut CheckoutRecord,
        stage: Stage,
        step: impl Future<Output = std::result::Result<(), StageError>>,
    ) {
        match step.await {
            Ok(()) => {
                self.record(record, CheckoutEvent::stage_completed(stage))
                    .await;
            }
            Err(err) => {
                tracing::warn!(%stage, error = %err, "best-effort stage failed, order still placed");
                metrics::counter!("checkout_stage_warnings_total", "stage" => stage.as_str())
                    .increment(1);
                self.record(record, CheckoutEvent::stage_warning(stage, &err))
                    .await;
            }
        }
    }

    async fn record(&self, record: &mut CheckoutRecord, event: CheckoutEvent) {
        tracing::debug!(event_type = event.event_type(), "checkout event");
        record.apply(event);
        self.journal.save(record).await;
    }

    /// Awaits a collaborator call under the configured deadline.
    async fn call<T, E>(
        &self,
        service: &'static str,
        call: impl Future<Output = std::result::Result<T, E>>,
    ) -> std::result::Result<T, StageError>
    where
        E: Into<StageError>,
    {
        match tokio::time::timeout(self.config.call_timeout, call).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(ServiceError::unavailable(
                service,
                format!("no response within {}ms", self.config.call_timeout.as_millis()),
            )
            .into()),
        }
    }

    async fn fetch_cart(&self, user_id: &UserId) -> std::result::Result<Cart, StageError> {
        self.call("cart", async {
            self.cart_store.get_cart(user_id).await.map_err(cart_unavailable)
        })
        .await
    }

    async fn price_items(&self, cart: &Cart) -> std::result::Result<Vec<PricedLine>, StageError> {
        let mut priced = Vec::with_capacity(cart.items.len());
        for item in &cart.items {
            let product = self
                .call("catalog", self.catalog.get_product(&item.product_id))
                .await?;
            priced.push(PricedLine {
                item: item.clone(),
                price: product.price_usd,
            });
        }
        Ok(priced)
    }

    async fn quote_shipping(
        &self,
        address: &Address,
        items: &[CartItem],
    ) -> std::result::Result<Money, StageError> {
        self.call("shipping", self.shipping.get_quote(address, items))
            .await
    }

    fn convert_costs(
        &self,
        priced: &[PricedLine],
        shipping_quote: &Money,
        currency: &str,
    ) -> std::result::Result<(Vec<OrderItem>, Money), StageError> {
        let items = priced
            .iter()
            .map(|line| -> std::result::Result<OrderItem, StageError> {
                Ok(OrderItem {
                    item: line.item.clone(),
                    cost: self.converter.convert(&line.price, currency)?,
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let shipping_cost = self.converter.convert(shipping_quote, currency)?;
        Ok((items, shipping_cost))
    }

    /// Sums the converted costs and charges the total.
    async fn charge_card(
        &self,
        items: &[OrderItem],
        shipping_cost: &Money,
        card: &CreditCardInfo,
    ) -> std::result::Result<(String, Money), StageError> {
        let total = items.iter().try_fold(shipping_cost.clone(), |acc, item| {
            acc.add(&item.line_total()?)
        })?;
        let charged = self.call("payment", self.payment.charge(&total, card)).await?;
        Ok((charged.transaction_id, total))
    }

    async fn ship_order(
        &self,
        address: &Address,
        items: &[CartItem],
    ) -> std::result::Result<String, StageError> {
        let shipment = self
            .call("shipping", self.shipping.ship_order(address, items))
            .await?;
        Ok(shipment.tracking_id)
    }

    async fn empty_cart(&self, user_id: &UserId) -> std::result::Result<(), StageError> {
        self.call("cart", async {
            self.cart_store
                .empty_cart(user_id)
                .await
                .map_err(cart_unavailable)
        })
        .await
    }

    /// Sends the order confirmation on its own task, bounded by the call
    /// timeout. Runs after the record reached `Completed`, so the journal
    /// update cannot be overwritten by the checkout itself.
    fn dispatch_confirmation(&self, email: String, order: OrderResult) {
        let notifier = self.notifier.clone();
        let journal = self.journal.clone();
        let deadline = self.config.call_timeout;

        let send = async move {
            let outcome =
                match tokio::time::timeout(deadline, notifier.send_order_confirmation(&email, &order))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ServiceError::unavailable(
                        "notification",
                        format!("no response within {}ms", deadline.as_millis()),
                    )),
                };
            if let Err(err) = outcome {
                let stage = Stage::Notify;
                tracing::warn!(%stage, error = %err, "order confirmation failed, order still placed");
                metrics::counter!("checkout_stage_warnings_total", "stage" => stage.as_str())
                    .increment(1);
                journal
                    .update(order.order_id, |record| {
                        record.apply(CheckoutEvent::stage_warning(stage, &err))
                    })
                    .await;
            }
        };
        tokio::spawn(send.instrument(tracing::Span::current()));
    }
}

/// Cart storage failures surface as an unavailable collaborator; the
/// detail (which may name the database host) only goes to the log.
fn cart_unavailable(err: CartStoreError) -> ServiceError {
    tracing::warn!(error = %err, "cart store call failed");
    ServiceError::unavailable("cart", "cart storage unavailable")
}
