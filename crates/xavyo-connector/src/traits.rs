//! Connector contract traits
//!
//! Every resource driver implements [`ConnectorInstance`]. All resource
//! operations are schema-qualified: the caller passes the
//! [`ResourceObjectDefinition`] it expects, so driver and caller agree on
//! attribute shapes.

use async_trait::async_trait;
use xavyo_schema::{QName, ResourceObjectDefinition, Schema};

use crate::change::{Change, Token};
use crate::error::ConnectorResult;
use crate::operation::{
    AdditionalOperation, AttributeModification, AttributeReport, AttributeSet, Filter,
    ResourceObject,
};
use crate::result::OperationResult;
use crate::types::{Capability, HandlerControl, LifecycleState};

/// Receiver of search results.
///
/// Implemented for closures, so most callers pass
/// `&mut |object| { ...; HandlerControl::Continue }`.
pub trait ResultHandler: Send {
    /// Handle one matching object. Returning [`HandlerControl::Stop`] ends
    /// the search without error.
    fn handle(&mut self, object: ResourceObject) -> HandlerControl;
}

impl<F> ResultHandler for F
where
    F: FnMut(ResourceObject) -> HandlerControl + Send,
{
    fn handle(&mut self, object: ResourceObject) -> HandlerControl {
        self(object)
    }
}

/// Handler that collects every object, optionally up to a limit.
#[derive(Debug, Default)]
pub struct CollectingHandler {
    objects: Vec<ResourceObject>,
    limit: Option<usize>,
}

impl CollectingHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the search once `limit` objects were collected.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            objects: Vec::new(),
            limit: Some(limit),
        }
    }

    #[must_use]
    pub fn objects(&self) -> &[ResourceObject] {
        &self.objects
    }

    #[must_use]
    pub fn into_objects(self) -> Vec<ResourceObject> {
        self.objects
    }
}

impl ResultHandler for CollectingHandler {
    fn handle(&mut self, object: ResourceObject) -> HandlerControl {
        self.objects.push(object);
        match self.limit {
            Some(limit) if self.objects.len() >= limit => HandlerControl::Stop,
            _ => HandlerControl::Continue,
        }
    }
}

/// The contract every resource driver implements.
///
/// One instance is bound to exactly one resource. Instances move through
/// `Unconfigured → Configured → Initialized → Active`; calling a resource
/// operation before `initialize` fails with
/// [`ConnectorError::IllegalState`](crate::error::ConnectorError::IllegalState).
///
/// Drivers whose protocol is not thread-safe serialize calls internally.
///
/// # Mutations
///
/// An error from `add_object`, `modify_object` or `delete_object` promises
/// that nothing changed on the resource. When the outcome is ambiguous (for
/// example a timeout after the request was sent) the driver returns
/// `Ok` with whatever it knows instead of an error, so that callers never
/// retry an operation that may already have been applied.
///
/// Requested [`AdditionalOperation`]s the driver cannot run are rejected
/// before anything is written.
///
/// # Results
///
/// Every operation also takes the caller's [`OperationResult`]. The driver
/// appends one sub-result named after the operation (`"add_object"`,
/// `"fetch_changes"`, ...) and records its own steps beneath it. The status
/// recorded there always agrees with the returned value.
#[async_trait]
pub trait ConnectorInstance: Send + Sync {
    /// Validate and store configuration. Never contacts the resource.
    async fn configure(
        &self,
        configuration: &serde_json::Value,
        result: &mut OperationResult,
    ) -> ConnectorResult<()>;

    /// Prepare the instance for resource access.
    ///
    /// May contact the resource to fetch capabilities and schema, which are
    /// cached for the instance's lifetime. Calling it again refreshes the
    /// cache.
    async fn initialize(&self, result: &mut OperationResult) -> ConnectorResult<()>;

    async fn lifecycle_state(&self) -> LifecycleState;

    /// Schema of the configuration this driver accepts, if it publishes one.
    fn generate_connector_schema(&self) -> Option<Schema> {
        None
    }

    /// Native capabilities, or `None` when the resource cannot tell.
    async fn capabilities(
        &self,
        result: &mut OperationResult,
    ) -> ConnectorResult<Option<Vec<Capability>>>;

    /// Resource schema, or `None` when the resource cannot tell.
    async fn resource_schema(
        &self,
        result: &mut OperationResult,
    ) -> ConnectorResult<Option<Schema>>;

    /// Fetch one object by its primary identifiers.
    ///
    /// `attributes_to_return` limits the returned attributes; `None` means
    /// the driver's default set.
    async fn fetch_object(
        &self,
        object_class: &ResourceObjectDefinition,
        identifiers: &AttributeSet,
        attributes_to_return: Option<&[QName]>,
        result: &mut OperationResult,
    ) -> ConnectorResult<ResourceObject>;

    /// Deliver every object matching `query` to `handler`, in resource order.
    ///
    /// Returns once all matches were delivered or the handler asked to stop.
    /// A `None` query matches every object of the class.
    async fn search(
        &self,
        object_class: &ResourceObjectDefinition,
        query: Option<&Filter>,
        handler: &mut dyn ResultHandler,
        result: &mut OperationResult,
    ) -> ConnectorResult<()>;

    /// Create an object.
    ///
    /// The report carries attributes the driver learned as a side effect of
    /// the write, typically generated identifiers.
    async fn add_object(
        &self,
        object_class: &ResourceObjectDefinition,
        object: &ResourceObject,
        additional_operations: &[AdditionalOperation],
        result: &mut OperationResult,
    ) -> ConnectorResult<AttributeReport>;

    async fn modify_object(
        &self,
        object_class: &ResourceObjectDefinition,
        identifiers: &AttributeSet,
        modifications: &[AttributeModification],
        additional_operations: &[AdditionalOperation],
        result: &mut OperationResult,
    ) -> ConnectorResult<AttributeReport>;

    async fn delete_object(
        &self,
        object_class: &ResourceObjectDefinition,
        identifiers: &AttributeSet,
        additional_operations: &[AdditionalOperation],
        result: &mut OperationResult,
    ) -> ConnectorResult<()>;

    /// Token for "now". Fetching changes from it right away yields nothing
    /// unless the resource changed in between.
    async fn fetch_current_token(
        &self,
        object_class: &ResourceObjectDefinition,
        result: &mut OperationResult,
    ) -> ConnectorResult<Token>;

    /// Changes after `last_token`, in order, each carrying its own token.
    ///
    /// `None` starts from the earliest retained history.
    async fn fetch_changes(
        &self,
        object_class: &ResourceObjectDefinition,
        last_token: Option<&Token>,
        result: &mut OperationResult,
    ) -> ConnectorResult<Vec<Change>>;

    /// Rebuild a token from its persisted form, including forms written by
    /// earlier driver versions.
    fn deserialize_token(&self, serialized: &str) -> ConnectorResult<Token> {
        Token::parse_serialized(serialized)
    }

    /// Self-check of configuration and connectivity.
    ///
    /// Failures of the check are recorded in `result`; an error is returned
    /// only when the instance was never configured.
    async fn test(&self, result: &mut OperationResult) -> ConnectorResult<()>;
}

/// A connector instance behind a trait object.
pub type BoxedConnector = Box<dyn ConnectorInstance>;
