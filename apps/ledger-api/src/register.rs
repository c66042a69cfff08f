//! # Register Actor
//!
//! Single writer for one register's shift ledger.
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Register Actor                                       │
//! │                                                                         │
//! │  HTTP handlers ──► RegisterHandle ──mpsc──► RegisterActor               │
//! │                         ▲                        │                      │
//! │                         │                        │ 1. clone ledger      │
//! │                      oneshot                     │ 2. apply command     │
//! │                      reply                       │ 3. persist (SQLite)  │
//! │                         │                        │ 4. commit clone      │
//! │                         └────────────────────────┤ 5. publish shift     │
//! │                                                  ▼                      │
//! │  GET /shifts/current ◄──── watch<Option<Shift>> ─┘                      │
//! │                                                                         │
//! │  A failed step 2 or 3 drops the clone: the ledger is unchanged.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use shiftbook_core::order::{format_order_number, order_number_prefix};
use shiftbook_core::validation::validate_uuid;
use shiftbook_core::{
    CloseShift, CoreError, Money, OpenShift, Order, OrderDraft, PaymentMethod,
    ReconciliationReport, RecordOutcome, Shift, ShiftLedger, ValidationError,
};
use shiftbook_db::{Database, DbError};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

// =============================================================================
// Constants
// =============================================================================

/// Commands queued before senders start waiting.
const COMMAND_BUFFER: usize = 64;

// =============================================================================
// Errors
// =============================================================================

/// Register command failures.
#[derive(Debug, Error)]
pub enum RegisterError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),

    /// Stored state disagrees with the in-memory ledger.
    #[error("Ledger out of sync with storage: {0}")]
    Inconsistent(String),

    /// The actor task has stopped.
    #[error("Register actor is not running")]
    Closed,
}

pub type RegisterResult<T> = Result<T, RegisterError>;

// =============================================================================
// Commands
// =============================================================================

/// A console's request to take payment for an order.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    /// Client-chosen id; resubmitting it returns the stored order.
    pub id: Option<String>,
    pub draft: OrderDraft,
    /// Required for cash; card and other default to the exact total.
    pub cash_received: Option<Money>,
}

/// Outcome of [`RegisterHandle::place_order`].
#[derive(Debug, Clone)]
pub enum PlacedOrder {
    Created(Order),
    Replayed(Order),
}

impl PlacedOrder {
    pub fn order(&self) -> &Order {
        match self {
            PlacedOrder::Created(order) | PlacedOrder::Replayed(order) => order,
        }
    }

    pub fn into_order(self) -> Order {
        match self {
            PlacedOrder::Created(order) | PlacedOrder::Replayed(order) => order,
        }
    }
}

enum Command {
    OpenShift {
        cmd: OpenShift,
        reply: oneshot::Sender<RegisterResult<Shift>>,
    },
    CloseShift {
        cmd: CloseShift,
        reply: oneshot::Sender<RegisterResult<(Shift, ReconciliationReport)>>,
    },
    PlaceOrder {
        request: PlaceOrder,
        reply: oneshot::Sender<RegisterResult<PlacedOrder>>,
    },
}

// =============================================================================
// Handle
// =============================================================================

/// Cloneable handle used by request handlers.
#[derive(Clone)]
pub struct RegisterHandle {
    commands: mpsc::Sender<Command>,
    current: watch::Receiver<Option<Shift>>,
}

impl RegisterHandle {
    /// Restores the ledger from the database and starts the actor.
    pub async fn spawn(db: Database, register_id: impl Into<String>) -> RegisterResult<Self> {
        let register_id = register_id.into();

        let active = db.shifts().get_active(&register_id).await?;
        let applied = match &active {
            Some(shift) => db.orders().completed_ids_for_shift(&shift.id).await?,
            None => Vec::new(),
        };
        let closed = db.shifts().closed_ids(&register_id).await?;

        info!(
            register_id = %register_id,
            active_shift = ?active.as_ref().map(|s| s.id.as_str()),
            applied_orders = applied.len(),
            closed_shifts = closed.len(),
            "Restored shift ledger"
        );

        let ledger = ShiftLedger::restore(active, applied, closed);
        let (shift_tx, current) = watch::channel(ledger.current_shift().cloned());
        let (commands, command_rx) = mpsc::channel(COMMAND_BUFFER);

        let actor = RegisterActor {
            ledger,
            db,
            register_id,
            shift_tx,
        };
        tokio::spawn(actor.run(command_rx));

        Ok(RegisterHandle { commands, current })
    }

    /// Latest committed active shift.
    pub fn current_shift(&self) -> Option<Shift> {
        self.current.borrow().clone()
    }

    pub async fn open_shift(&self, cmd: OpenShift) -> RegisterResult<Shift> {
        self.request(|reply| Command::OpenShift { cmd, reply }).await
    }

    pub async fn close_shift(&self, cmd: CloseShift) -> RegisterResult<(Shift, ReconciliationReport)> {
        self.request(|reply| Command::CloseShift { cmd, reply }).await
    }

    pub async fn place_order(&self, request: PlaceOrder) -> RegisterResult<PlacedOrder> {
        self.request(|reply| Command::PlaceOrder { request, reply })
            .await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<RegisterResult<T>>) -> Command,
    ) -> RegisterResult<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| RegisterError::Closed)?;
        response.await.map_err(|_| RegisterError::Closed)?
    }
}

// =============================================================================
// Actor
// =============================================================================

struct RegisterActor {
    ledger: ShiftLedger,
    db: Database,
    register_id: String,
    shift_tx: watch::Sender<Option<Shift>>,
}

impl RegisterActor {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        while let Some(command) = commands.recv().await {
            match command {
                Command::OpenShift { cmd, reply } => {
                    let _ = reply.send(self.open_shift(cmd).await);
                }
                Command::CloseShift { cmd, reply } => {
                    let _ = reply.send(self.close_shift(cmd).await);
                }
                Command::PlaceOrder { request, reply } => {
                    let _ = reply.send(self.place_order(request).await);
                }
            }
        }
        info!(register_id = %self.register_id, "Register actor stopped");
    }

    async fn open_shift(&mut self, cmd: OpenShift) -> RegisterResult<Shift> {
        let mut working = self.ledger.clone();
        let shift = working.open_shift(cmd, Uuid::new_v4().to_string(), Utc::now())?;

        self.db.shifts().insert(&shift, &self.register_id).await?;
        self.commit(working);

        info!(
            shift_id = %shift.id,
            operator_id = %shift.opening_user_id,
            start_cash = shift.start_cash_amount.cents(),
            "Shift opened"
        );
        Ok(shift)
    }

    async fn close_shift(&mut self, cmd: CloseShift) -> RegisterResult<(Shift, ReconciliationReport)> {
        let mut working = self.ledger.clone();
        let (shift, report) = working.close_shift(cmd, Utc::now())?;

        self.db.shifts().close(&shift).await?;
        self.commit(working);

        info!(
            shift_id = %shift.id,
            total_orders = shift.total_orders,
            total_sales = shift.total_sales.cents(),
            variance = report.variance.cents(),
            outcome = ?report.outcome,
            "Shift closed"
        );
        Ok((shift, report))
    }

    async fn place_order(&mut self, request: PlaceOrder) -> RegisterResult<PlacedOrder> {
        if let Some(id) = &request.id {
            validate_uuid("id", id).map_err(CoreError::from)?;
            if let Some(existing) = self.db.orders().get_by_id(&self.register_id, id).await? {
                debug!(order_id = %id, "Order replayed");
                return Ok(PlacedOrder::Replayed(existing));
            }
        }

        self.ledger.ensure_accepts(&request.draft.shift_id)?;

        let now = Utc::now();
        let id = request.id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let sequence = self
            .db
            .orders()
            .next_sequence(&order_number_prefix(now.date_naive()))
            .await?;
        let order_number = format_order_number(now.date_naive(), sequence);

        let pending = Order::new_pending(request.draft, id, order_number, now)?;
        let tendered = match (request.cash_received, pending.payment_method) {
            (Some(cash), _) => cash,
            (None, PaymentMethod::Cash) => {
                return Err(CoreError::from(ValidationError::Required {
                    field: "cashReceived".to_string(),
                })
                .into())
            }
            (None, _) => pending.total_amount(),
        };
        let completed = pending.complete(tendered, now)?;

        let completion = completed
            .completion()
            .ok_or_else(|| RegisterError::Inconsistent("completed order has no completion".into()))?;

        let mut working = self.ledger.clone();
        let outcome =
            working.record_completed_order(&completion.shift_id, &completion.order_id, completion.total)?;
        if outcome == RecordOutcome::Duplicate {
            warn!(order_id = %completion.order_id, "Order counted in ledger but missing from storage");
            return Err(RegisterError::Inconsistent(format!(
                "order {} already counted",
                completion.order_id
            )));
        }

        let shift = working
            .current_shift()
            .cloned()
            .ok_or_else(|| RegisterError::Inconsistent("shift closed while recording".into()))?;

        self.db.orders().insert_completed(&completed, &shift).await?;
        self.commit(working);

        info!(
            order_id = %completed.id,
            order_number = %completed.order_number,
            shift_id = %shift.id,
            total = completed.total_amount().cents(),
            "Order completed"
        );
        Ok(PlacedOrder::Created(completed))
    }

    fn commit(&mut self, working: ShiftLedger) {
        self.ledger = working;
        self.shift_tx.send_replace(self.ledger.current_shift().cloned());
    }
}

// =============================================================================
// Tests
// =============================================================================
