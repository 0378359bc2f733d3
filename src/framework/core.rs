//! # Core Actor Framework
//!
//! Generic building blocks the tracker is assembled from.
//!
//! ## Key Types
//!
//! - [`ActorEntity`]: The trait a tracked resource implements.
//! - [`ResourceActor`]: The task that owns every entity of one type.
//! - [`ResourceClient`]: The cloneable handle used to talk to that task.
//! - [`FrameworkError`]: Transport-level failures (actor gone, unknown id, entity error).

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// Trait that any resource entity must implement to be managed by [`ResourceActor`].
///
/// # Architecture Note
/// The actor loop is written once against this contract. Associated types keep
/// each resource's payloads apart: an order's `Create` payload cannot be sent to
/// an actor managing something else.
///
/// # Async & Context
/// Hooks are `#[async_trait]` so they may await other actors. The `Context` type is
/// handed to every hook and is supplied when the actor is started (`run(context)`),
/// not when it is built.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// Identifier type. Built from the actor's `u32` counter.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// Payload required to create a new instance.
    type Create: Send + Sync + Debug;

    /// Payload required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Resource-specific operations beyond CRUD.
    type Action: Send + Sync + Debug;

    /// Result returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// Runtime dependencies injected into the hooks. Use `()` if none.
    type Context: Send + Sync;

    /// One error enum per actor, shared by every hook.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the entity from its id and payload. Called before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks (Async) ---

    /// Called after construction, before the entity is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(&mut self, update: Self::Update, ctx: &Self::Context) -> Result<(), Self::Error>;

    /// Called immediately before the entity is removed.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}

// =============================================================================
// 2. THE GENERIC MESSAGES & ERRORS
// =============================================================================

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Request sent to a [`ResourceActor`].
///
/// The variants are the CRUD lifecycle plus `List` (read every entity) and
/// `Action` (resource-specific operations that don't fit CRUD). Every payload type
/// comes from the entity's associated types.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// The generic actor that owns every entity of type `T`.
///
/// **Concurrency Model**: the actor processes its mailbox sequentially, so the
/// `store` needs no lock. A location ticker and a user-driven status change aimed
/// at the same order are applied one after the other, never interleaved.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id: u32,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates the actor and its client. `buffer_size` is the mailbox capacity;
    /// senders wait when it is full.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id: 1,
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Runs the event loop until every client has been dropped.
    ///
    /// `context` is passed to every entity hook.
    pub async fn run(mut self, context: T::Context) {
        // "TrackedOrder" instead of "delivery_tracker::model::order::TrackedOrder"
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    // Ids are only consumed by successful creates.
                    let id = T::Id::from(self.next_id);

                    match T::from_create_params(id.clone(), params) {
                        Ok(mut item) => {
                            if let Err(e) = item.on_create(&context).await {
                                warn!(entity_type, error = %e, "on_create failed");
                                let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                                continue;
                            }
                            self.next_id += 1;
                            self.store.insert(id.clone(), item);
                            info!(entity_type, %id, size = self.store.len(), "Created");
                            let _ = respond_to.send(Ok(id));
                        }
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    debug!(entity_type, size = self.store.len(), "List");
                    let items = self.store.values().cloned().collect();
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update { id, update, respond_to } => {
                    debug!(entity_type, %id, ?update, "Update");
                    if let Some(item) = self.store.get_mut(&id) {
                        if let Err(e) = item.on_update(update, &context).await {
                            warn!(entity_type, %id, error = %e, "Update failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                        info!(entity_type, %id, "Updated");
                        let _ = respond_to.send(Ok(item.clone()));
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    if let Some(item) = self.store.get(&id) {
                        if let Err(e) = item.on_delete(&context).await {
                            warn!(entity_type, %id, error = %e, "on_delete failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                        self.store.remove(&id);
                        info!(entity_type, %id, size = self.store.len(), "Deleted");
                        let _ = respond_to.send(Ok(()));
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    debug!(entity_type, %id, ?action, "Action");
                    if let Some(item) = self.store.get_mut(&id) {
                        let result = item
                            .handle_action(action, &context)
                            .await
                            .map_err(|e| FrameworkError::EntityError(Box::new(e)));
                        match &result {
                            Ok(_) => debug!(entity_type, %id, "Action ok"),
                            Err(e) => warn!(entity_type, %id, error = %e, "Action failed"),
                        }
                        let _ = respond_to.send(result);
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

/// A type-safe client for interacting with a [`ResourceActor`]. Holds only a
/// sender, so cloning is cheap.
#[derive(Clone)]
pub struct ResourceClient<T: ActorEntity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: ActorEntity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn create(&self, params: T::Create) -> Result<T::Id, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Create { params, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Get { id, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::List { respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<T, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Update { id, update, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Delete { id, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Action { id, action, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }
}

// =============================================================================
// 5. TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // --- Domain Definition ---

    #[derive(Clone, Debug, PartialEq)]
    struct Parcel {
        id: u32,
        label: String,
        scans: u32,
        sealed: bool,
    }

    #[derive(Debug)]
    struct ParcelCreate {
        label: String,
    }

    #[derive(Debug)]
    struct ParcelUpdate {
        label: Option<String>,
    }

    #[derive(Debug)]
    enum ParcelAction {
        Scan,
        Seal,
    }

    #[derive(Debug, thiserror::Error)]
    enum ParcelError {
        #[error("parcel {0} is sealed")]
        Sealed(u32),
        #[error("empty label")]
        EmptyLabel,
    }

    #[async_trait]
    impl ActorEntity for Parcel {
        type Id = u32;
        type Create = ParcelCreate;
        type Update = ParcelUpdate;
        type Action = ParcelAction;
        type ActionResult = u32;
        type Context = ();
        type Error = ParcelError;

        fn from_create_params(id: u32, params: ParcelCreate) -> Result<Self, ParcelError> {
            if params.label.is_empty() {
                return Err(ParcelError::EmptyLabel);
            }
            Ok(Self {
                id,
                label: params.label,
                scans: 0,
                sealed: false,
            })
        }

        async fn on_update(&mut self, update: ParcelUpdate, _ctx: &()) -> Result<(), ParcelError> {
            if self.sealed {
                return Err(ParcelError::Sealed(self.id));
            }
            if let Some(label) = update.label {
                self.label = label;
            }
            Ok(())
        }

        async fn handle_action(&mut self, action: ParcelAction, _ctx: &()) -> Result<u32, ParcelError> {
            match action {
                ParcelAction::Scan => {
                    self.scans += 1;
                    Ok(self.scans)
                }
                ParcelAction::Seal => {
                    self.sealed = true;
                    Ok(self.scans)
                }
            }
        }
    }

    // --- Test ---

    #[tokio::test]
    async fn test_resource_actor_lifecycle() {
        let (actor, client) = ResourceActor::<Parcel>::new(10);
        let handle = tokio::spawn(actor.run(()));

        // 1. Create
        let id = client.create(ParcelCreate { label: "box".into() }).await.unwrap();
        assert_eq!(id, 1);
        let second = client.create(ParcelCreate { label: "crate".into() }).await.unwrap();
        assert_eq!(second, 2);

        // 2. Actions mutate in place
        assert_eq!(client.perform_action(id, ParcelAction::Scan).await.unwrap(), 1);
        assert_eq!(client.perform_action(id, ParcelAction::Scan).await.unwrap(), 2);

        // 3. Update
        let updated = client.update(id, ParcelUpdate { label: Some("big box".into()) }).await.unwrap();
        assert_eq!(updated.label, "big box");
        assert_eq!(updated.scans, 2);

        // 4. List
        let mut all = client.list().await.unwrap();
        all.sort_by_key(|p| p.id);
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].label, "crate");

        // 5. Delete
        client.delete(second).await.unwrap();
        assert!(client.get(second).await.unwrap().is_none());

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_entity_errors_are_boxed() {
        let (actor, client) = ResourceActor::<Parcel>::new(10);
        tokio::spawn(actor.run(()));

        let err = client.create(ParcelCreate { label: String::new() }).await.unwrap_err();
        assert!(matches!(err, FrameworkError::EntityError(_)));
        assert_eq!(err.to_string(), "Entity error: empty label");

        let id = client.create(ParcelCreate { label: "box".into() }).await.unwrap();
        client.perform_action(id, ParcelAction::Seal).await.unwrap();
        let err = client.update(id, ParcelUpdate { label: None }).await.unwrap_err();
        assert_eq!(err.to_string(), "Entity error: parcel 1 is sealed");

        let err = client.perform_action(99, ParcelAction::Scan).await.unwrap_err();
        assert!(matches!(err, FrameworkError::NotFound(ref id) if id == "99"));
    }

    #[tokio::test]
    async fn test_closed_actor_reports_closed() {
        let (actor, client) = ResourceActor::<Parcel>::new(1);
        drop(actor);
        let err = client.get(1).await.unwrap_err();
        assert!(matches!(err, FrameworkError::ActorClosed));
    }
}
