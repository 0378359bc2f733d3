//! # Mock Framework
//!
//! Test doubles for code that talks to a [`ResourceClient`] without running a
//! [`ResourceActor`](crate::framework::ResourceActor).
//!
//! Two styles are offered:
//!
//! - [`MockClient`]: queue canned responses up front, run the code under test,
//!   then call [`MockClient::verify`].
//! - [`create_mock_client`] with [`expect_create`], [`expect_get`] and
//!   [`expect_action`]: receive each request yourself and answer it by hand, which
//!   lets a test inspect the payload before replying.

use crate::framework::{ActorEntity, FrameworkError, ResourceClient, ResourceRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, oneshot};

/// One queued response, matched against the next incoming request.
enum Expectation<T: ActorEntity> {
    Create(Result<T::Id, FrameworkError>),
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    List(Result<Vec<T>, FrameworkError>),
    Update {
        id: T::Id,
        response: Result<T, FrameworkError>,
    },
    Action {
        id: T::Id,
        response: Result<T::ActionResult, FrameworkError>,
    },
}

impl<T: ActorEntity> Expectation<T> {
    fn name(&self) -> &'static str {
        match self {
            Expectation::Create(_) => "create",
            Expectation::Get { .. } => "get",
            Expectation::List(_) => "list",
            Expectation::Update { .. } => "update",
            Expectation::Action { .. } => "action",
        }
    }
}

fn request_name<T: ActorEntity>(request: &ResourceRequest<T>) -> String {
    match request {
        ResourceRequest::Create { .. } => "create".to_string(),
        ResourceRequest::Get { id, .. } => format!("get {}", id),
        ResourceRequest::List { .. } => "list".to_string(),
        ResourceRequest::Update { id, .. } => format!("update {}", id),
        ResourceRequest::Delete { id, .. } => format!("delete {}", id),
        ResourceRequest::Action { id, action, .. } => format!("action {:?} on {}", action, id),
    }
}

struct MockState<T: ActorEntity> {
    expectations: VecDeque<Expectation<T>>,
    mismatches: Vec<String>,
}

type Shared<T> = Arc<Mutex<MockState<T>>>;

fn lock<T: ActorEntity>(state: &Shared<T>) -> MutexGuard<'_, MockState<T>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A client whose requests are answered from a queue of expectations.
///
/// A request that does not match the head of the queue (wrong kind or wrong id)
/// is answered by dropping its response channel, so the caller sees
/// [`FrameworkError::ActorDropped`], and the mismatch is reported by
/// [`verify`](MockClient::verify).
///
/// # Example
/// ```ignore
/// let mut mock = MockClient::<TrackedOrder>::new();
/// mock.expect_create().return_ok(OrderId(1));
/// mock.expect_action(OrderId(1)).return_ok(OrderActionResult::AdvanceStatus(change));
///
/// let client = TrackingClient::new(mock.client());
/// // exercise the client...
/// mock.verify();
/// ```
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    state: Shared<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> MockClient<T> {
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let state: Shared<T> = Arc::new(Mutex::new(MockState {
            expectations: VecDeque::new(),
            mismatches: Vec::new(),
        }));
        let task_state = state.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let mut guard = lock(&task_state);
                let expectation = guard.expectations.pop_front();

                match (request, expectation) {
                    (ResourceRequest::Create { respond_to, .. }, Some(Expectation::Create(response))) => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Get { id, respond_to }, Some(Expectation::Get { id: expected, response }))
                        if id == expected =>
                    {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::List { respond_to }, Some(Expectation::List(response))) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Update { id, respond_to, .. },
                        Some(Expectation::Update { id: expected, response }),
                    ) if id == expected => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Action { id, respond_to, .. },
                        Some(Expectation::Action { id: expected, response }),
                    ) if id == expected => {
                        let _ = respond_to.send(response);
                    }
                    (request, expectation) => {
                        let expected = expectation.as_ref().map_or("nothing", |e| e.name());
                        guard
                            .mismatches
                            .push(format!("expected {}, got {}", expected, request_name(&request)));
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            state,
            _handle: handle,
        }
    }

    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    pub fn expect_create(&mut self) -> CreateExpectation<T> {
        CreateExpectation {
            state: self.state.clone(),
        }
    }

    pub fn expect_get(&mut self, id: T::Id) -> GetExpectation<T> {
        GetExpectation {
            id,
            state: self.state.clone(),
        }
    }

    /// Queues the response to the next `list` request.
    pub fn expect_list(&mut self, response: Result<Vec<T>, FrameworkError>) {
        lock(&self.state).expectations.push_back(Expectation::List(response));
    }

    /// Queues the response to the next `update` of `id`.
    pub fn expect_update(&mut self, id: T::Id, response: Result<T, FrameworkError>) {
        lock(&self.state)
            .expectations
            .push_back(Expectation::Update { id, response });
    }

    pub fn expect_action(&mut self, id: T::Id) -> ActionExpectation<T> {
        ActionExpectation {
            id,
            state: self.state.clone(),
        }
    }

    /// Panics if any expectation is left unused or any request did not match.
    pub fn verify(&self) {
        let guard = lock(&self.state);
        if !guard.mismatches.is_empty() {
            panic!("Unexpected requests: {:?}", guard.mismatches);
        }
        if !guard.expectations.is_empty() {
            panic!("Not all expectations were met. {} remaining", guard.expectations.len());
        }
    }
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct CreateExpectation<T: ActorEntity> {
    state: Shared<T>,
}

impl<T: ActorEntity> CreateExpectation<T> {
    pub fn return_ok(self, id: T::Id) {
        lock(&self.state).expectations.push_back(Expectation::Create(Ok(id)));
    }

    pub fn return_err(self, error: FrameworkError) {
        lock(&self.state).expectations.push_back(Expectation::Create(Err(error)));
    }
}

pub struct GetExpectation<T: ActorEntity> {
    id: T::Id,
    state: Shared<T>,
}

impl<T: ActorEntity> GetExpectation<T> {
    pub fn return_ok(self, value: Option<T>) {
        lock(&self.state).expectations.push_back(Expectation::Get {
            id: self.id,
            response: Ok(value),
        });
    }

    pub fn return_err(self, error: FrameworkError) {
        lock(&self.state).expectations.push_back(Expectation::Get {
            id: self.id,
            response: Err(error),
        });
    }
}

pub struct ActionExpectation<T: ActorEntity> {
    id: T::Id,
    state: Shared<T>,
}

impl<T: ActorEntity> ActionExpectation<T> {
    pub fn return_ok(self, result: T::ActionResult) {
        lock(&self.state).expectations.push_back(Expectation::Action {
            id: self.id,
            response: Ok(result),
        });
    }

    pub fn return_err(self, error: FrameworkError) {
        lock(&self.state).expectations.push_back(Expectation::Action {
            id: self.id,
            response: Err(error),
        });
    }
}

// =============================================================================
// MANUAL RESPONDERS
// =============================================================================

/// A client plus the receiving end of its mailbox.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Waits for the next request; `None` unless it is a `Create`.
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Create, oneshot::Sender<Result<T::Id, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Waits for the next request; `None` unless it is a `Get`.
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, oneshot::Sender<Result<Option<T>, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Waits for the next request; `None` unless it is an `Action`.
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, oneshot::Sender<Result<T::ActionResult, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinate, OrderCreate, OrderId, OrderStatus, TrackedOrder};
    use crate::order_actor::{OrderAction, OrderActionResult, StatusChange};
    use chrono::Utc;

    fn params() -> OrderCreate {
        OrderCreate {
            customer_address: "Av. Providencia 1234".to_string(),
            items: vec!["Longboard".to_string()],
            total: 89_990,
            destination: Coordinate::new(-33.4489, -70.6693),
            driver: None,
            driver_location: None,
        }
    }

    #[tokio::test]
    async fn manual_responder_sees_payload() {
        let (client, mut receiver) = create_mock_client::<TrackedOrder>(10);

        let create_task = tokio::spawn(async move { client.create(params()).await });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.items, vec!["Longboard".to_string()]);
        responder.send(Ok(OrderId(7))).unwrap();

        let id = create_task.await.unwrap().unwrap();
        assert_eq!(id, OrderId(7));
    }

    #[tokio::test]
    async fn manual_responder_for_actions() {
        let (client, mut receiver) = create_mock_client::<TrackedOrder>(10);

        let task = tokio::spawn(async move { client.perform_action(OrderId(3), OrderAction::AdvanceStatus).await });

        let (id, action, responder) = expect_action(&mut receiver).await.expect("Expected Action request");
        assert_eq!(id, OrderId(3));
        assert!(matches!(action, OrderAction::AdvanceStatus));
        let change = StatusChange {
            from: OrderStatus::Pending,
            to: OrderStatus::Confirmed,
        };
        responder.send(Ok(OrderActionResult::AdvanceStatus(change))).unwrap();

        match task.await.unwrap().unwrap() {
            OrderActionResult::AdvanceStatus(got) => assert_eq!(got, change),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[tokio::test]
    async fn queued_expectations_are_consumed_in_order() {
        let mut mock = MockClient::<TrackedOrder>::new();
        let order = TrackedOrder::new(OrderId(1), params(), Utc::now());

        mock.expect_create().return_ok(OrderId(1));
        mock.expect_get(OrderId(1)).return_ok(Some(order.clone()));
        mock.expect_list(Ok(vec![order]));

        let client = mock.client();
        assert_eq!(client.create(params()).await.unwrap(), OrderId(1));

        let fetched = client.get(OrderId(1)).await.unwrap().unwrap();
        assert_eq!(fetched.status, OrderStatus::Pending);

        assert_eq!(client.list().await.unwrap().len(), 1);
        mock.verify();
    }

    #[tokio::test]
    async fn wrong_id_is_a_mismatch() {
        let mut mock = MockClient::<TrackedOrder>::new();
        mock.expect_get(OrderId(1)).return_ok(None);

        let result = mock.client().get(OrderId(2)).await;
        assert!(matches!(result, Err(FrameworkError::ActorDropped)));

        let verify = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| mock.verify()));
        assert!(verify.is_err());
    }
}
