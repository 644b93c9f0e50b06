//! Controller actor with async message handling.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::{mpsc, oneshot, watch};

use super::{
    machine::{Controller, GameView},
    messages::{Action, ControllerMessage, DispatchError, Outcome, Step},
};
use crate::net::api::GameApi;

/// Controller actor handle for sending actions and reading views
#[derive(Clone)]
pub struct ControllerHandle {
    sender: mpsc::Sender<ControllerMessage>,
    busy: Arc<AtomicBool>,
    views: watch::Receiver<GameView>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl ControllerHandle {
    /// Sends an action to the controller.
    ///
    /// While a handler or a pacing timer is running the action is dropped
    /// and `Busy` is returned. Nothing is ever queued.
    pub async fn dispatch(&self, action: Action) -> Result<Outcome, DispatchError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("Dropping {action}: controller busy");
            return Err(DispatchError::Busy);
        }

        let (response, outcome) = oneshot::channel();
        if self
            .sender
            .send(ControllerMessage::Dispatch { action, response })
            .await
            .is_err()
        {
            self.busy.store(false, Ordering::Release);
            return Err(DispatchError::Closed);
        }
        outcome.await.map_err(|_| DispatchError::Closed)
    }

    /// Whether an action would currently be dropped
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Latest published view
    pub fn view(&self) -> GameView {
        self.views.borrow().clone()
    }

    /// Receiver notified after every controller step
    pub fn subscribe(&self) -> watch::Receiver<GameView> {
        self.views.clone()
    }

    /// Stops the actor. In-flight calls and timers are dropped.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}

/// Actor owning the controller inside a tokio task
pub struct ControllerActor<A> {
    controller: Controller<A>,

    /// Message inbox
    inbox: mpsc::Receiver<ControllerMessage>,

    /// Set while a handler runs; cleared only at rest in an input phase
    busy: Arc<AtomicBool>,

    /// View publisher
    views: watch::Sender<GameView>,

    shutdown: watch::Receiver<bool>,
}

impl<A: GameApi> ControllerActor<A> {
    /// Create a new controller actor
    ///
    /// # Returns
    ///
    /// * `(ControllerActor, ControllerHandle)` - Actor and handle for sending actions
    pub fn new(controller: Controller<A>) -> (Self, ControllerHandle) {
        let (sender, inbox) = mpsc::channel(8);
        let (views, view_receiver) = watch::channel(controller.view().clone());
        let (shutdown_sender, shutdown) = watch::channel(false);
        // The controller starts in LOADING, which is automatic.
        let busy = Arc::new(AtomicBool::new(true));

        let actor = Self {
            controller,
            inbox,
            busy: busy.clone(),
            views,
            shutdown,
        };
        let handle = ControllerHandle {
            sender,
            busy,
            views: view_receiver,
            shutdown: Arc::new(shutdown_sender),
        };
        (actor, handle)
    }

    /// Run the controller event loop
    pub async fn run(mut self) {
        log::info!("Controller starting in {}", self.controller.phase());

        loop {
            let mut shutdown = self.shutdown.clone();

            if self.controller.phase().is_automatic() {
                self.views.send_modify(|view| view.waiting = true);
            }
            let step = tokio::select! {
                step = self.controller.drive() => Some(step),
                _ = shutdown.wait_for(|stop| *stop) => None,
            };
            match step {
                None => break,
                Some(Step::Advanced(_)) => {
                    self.publish();
                    continue;
                }
                Some(Step::AwaitingInput) => {
                    self.busy.store(false, Ordering::Release);
                    self.publish();
                }
                Some(Step::Parked) => {
                    log::warn!("Controller parked in {}", self.controller.phase());
                    self.publish();
                }
            }

            let message = tokio::select! {
                message = self.inbox.recv() => message,
                _ = shutdown.wait_for(|stop| *stop) => None,
            };
            let Some(ControllerMessage::Dispatch { action, response }) = message else {
                break;
            };

            self.views.send_modify(|view| view.waiting = true);
            let outcome = tokio::select! {
                outcome = self.controller.dispatch(action) => Some(outcome),
                _ = shutdown.wait_for(|stop| *stop) => None,
            };
            let Some(outcome) = outcome else {
                break;
            };

            if !self.controller.phase().is_automatic() {
                self.busy.store(false, Ordering::Release);
            }
            self.publish();
            let _ = response.send(outcome);
        }

        log::info!("Controller stopped in {}", self.controller.phase());
    }

    fn publish(&self) {
        self.views.send_replace(self.controller.view().clone());
    }
}
