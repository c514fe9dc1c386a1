//! Common test utilities for xavyo-connector integration tests.
//!
//! [`MemoryConnector`] is a complete driver over an in-process store. It
//! keeps a change log with sequence-number tokens so the synchronization
//! properties can be checked without a real resource.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Once;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info};

use xavyo_connector::async_trait;
use xavyo_connector::prelude::*;
use xavyo_connector::resilience::with_timeout;

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

pub const NS: &str = "urn:test";

pub fn q(local: &str) -> QName {
    QName::new(NS, local)
}

/// Resource schema the memory driver reports.
pub const ACCOUNT_SCHEMA: &str = r#"
<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"
            xmlns:ra="urn:xavyo:schema:resource-annotation"
            xmlns:tns="urn:test"
            targetNamespace="urn:test"
            elementFormDefault="qualified">
    <xsd:complexType name="AccountObjectClass">
        <xsd:annotation>
            <xsd:appinfo>
                <ra:resourceObject/>
                <ra:accountType default="true"/>
                <ra:nativeObjectClass>__ACCOUNT__</ra:nativeObjectClass>
                <ra:identifier ref="tns:uid"/>
                <ra:secondaryIdentifier ref="tns:name"/>
                <ra:namingAttribute ref="tns:name"/>
            </xsd:appinfo>
        </xsd:annotation>
        <xsd:sequence>
            <xsd:element name="uid" type="xsd:string"/>
            <xsd:element name="name" type="xsd:string"/>
            <xsd:element name="fullName" type="xsd:string" minOccurs="0"/>
            <xsd:element name="mail" type="xsd:string" minOccurs="0" maxOccurs="unbounded"/>
        </xsd:sequence>
    </xsd:complexType>
    <xsd:complexType name="GroupObjectClass">
        <xsd:annotation>
            <xsd:appinfo>
                <ra:resourceObject/>
                <ra:nativeObjectClass>__GROUP__</ra:nativeObjectClass>
                <ra:identifier ref="tns:cn"/>
            </xsd:appinfo>
        </xsd:annotation>
        <xsd:sequence>
            <xsd:element name="cn" type="xsd:string"/>
        </xsd:sequence>
    </xsd:complexType>
</xsd:schema>"#;

/// Configuration of the memory driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Name of the simulated resource.
    pub resource: String,
    /// Number of connection attempts that fail before one succeeds.
    #[serde(default)]
    pub failing_connects: u32,
    /// Secret used by nothing; checks that redaction works.
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub connection: ConnectionSettings,
}

impl ConnectorConfig for MemoryConfig {
    fn validate(&self) -> ConnectorResult<()> {
        if self.resource.trim().is_empty() {
            return Err(ConnectorError::configuration("resource must not be empty"));
        }
        self.connection.validate()
    }

    fn redacted(&self) -> Self {
        Self {
            secret: self.secret.as_ref().map(|_| "***".to_string()),
            ..self.clone()
        }
    }
}

/// A working configuration with fast retries.
pub fn memory_config() -> serde_json::Value {
    json!({
        "resource": "memory",
        "connection": { "retry_delay_ms": 1 }
    })
}

#[derive(Debug, Default)]
struct Store {
    objects: Vec<ResourceObject>,
    changes: Vec<(u64, Change)>,
    sequence: u64,
}

impl Store {
    fn position(&self, object_class: &QName, identifiers: &AttributeSet) -> Option<usize> {
        self.objects
            .iter()
            .position(|o| {
                &o.object_class == object_class && o.attributes.contains_all(identifiers)
            })
    }

    fn record(
        &mut self,
        object_class: &QName,
        identifiers: AttributeSet,
        change_type: ChangeType,
        current: Option<ResourceObject>,
    ) {
        self.sequence += 1;
        let mut change = Change::new(
            object_class.clone(),
            identifiers,
            change_type,
            Token::from_sequence(self.sequence),
        )
        .with_timestamp(chrono::Utc::now());
        if let Some(current) = current {
            change = change.with_current(current);
        }
        self.changes.push((self.sequence, change));
    }
}

/// In-memory reference driver.
#[derive(Default)]
pub struct MemoryConnector {
    lifecycle: LifecycleTracker,
    config: RwLock<Option<MemoryConfig>>,
    schema: RwLock<Option<Schema>>,
    store: RwLock<Store>,
    scripts: RwLock<Vec<ScriptOperation>>,
    connect_attempts: AtomicU32,
}

/// Script language the memory driver runs; scripts without one use it too.
pub const SCRIPT_LANGUAGE: &str = "memory";

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connection attempts made so far, including failed ones.
    pub fn connect_attempts(&self) -> u32 {
        self.connect_attempts.load(Ordering::SeqCst)
    }

    /// Scripts run so far, in execution order.
    pub async fn executed_scripts(&self) -> Vec<ScriptOperation> {
        self.scripts.read().await.clone()
    }

    pub async fn redacted_config(&self) -> Option<MemoryConfig> {
        self.config.read().await.as_ref().map(ConnectorConfig::redacted)
    }

    async fn connect(&self, config: &MemoryConfig) -> ConnectorResult<()> {
        let attempt = self.connect_attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < config.failing_connects {
            return Err(ConnectorError::communication(format!(
                "{} refused connection",
                config.resource
            )));
        }
        Ok(())
    }

    async fn current_config(&self) -> ConnectorResult<MemoryConfig> {
        self.config
            .read()
            .await
            .clone()
            .ok_or_else(|| ConnectorError::illegal_state("connector is not configured"))
    }

    fn check_class(
        object_class: &ResourceObjectDefinition,
        object: &ResourceObject,
    ) -> ConnectorResult<()> {
        if &object.object_class != object_class.name() {
            return Err(ConnectorError::schema(format!(
                "object of class {} passed as {}",
                object.object_class,
                object_class.name()
            )));
        }
        Ok(())
    }

    fn check_scripts(operations: &[AdditionalOperation]) -> ConnectorResult<()> {
        let all = AdditionalOperation::scripts(operations, ScriptTiming::Before)
            .chain(AdditionalOperation::scripts(operations, ScriptTiming::After));
        for script in all {
            if let Some(language) = script.language.as_deref() {
                if language != SCRIPT_LANGUAGE {
                    return Err(ConnectorError::generic_framework(format!(
                        "unsupported script language {language}"
                    )));
                }
            }
        }
        Ok(())
    }

    async fn run_scripts(
        &self,
        operations: &[AdditionalOperation],
        timing: ScriptTiming,
        result: &mut OperationResult,
    ) {
        let mut executed = self.scripts.write().await;
        for script in AdditionalOperation::scripts(operations, timing) {
            debug!(code = %script.code, ?timing, "Running script");
            executed.push(script.clone());
            result.create_subresult("script").record_success();
        }
    }

    async fn initialize_with(&self, result: &mut OperationResult) -> ConnectorResult<()> {
        let config = self.current_config().await?;
        let retry = RetryExecutor::new(config.connection.retry_config());
        let connected = retry
            .execute(|| {
                with_timeout(
                    config.connection.connection_timeout(),
                    "connect",
                    self.connect(&config),
                )
            })
            .await;
        result.create_subresult("connect").record(&connected);
        connected?;

        let schema = xavyo_schema::parse_schema(ACCOUNT_SCHEMA).map_err(ConnectorError::from);
        result.create_subresult("schema").record(&schema);
        *self.schema.write().await = Some(schema?);
        self.lifecycle.mark_initialized().await?;
        info!(resource = %config.resource, "Memory connector ready");
        Ok(())
    }

    async fn fetch(
        &self,
        object_class: &ResourceObjectDefinition,
        identifiers: &AttributeSet,
        attributes_to_return: Option<&[QName]>,
    ) -> ConnectorResult<ResourceObject> {
        self.lifecycle.mark_active().await?;
        let store = self.store.read().await;
        let index = store
            .position(object_class.name(), identifiers)
            .ok_or_else(|| ConnectorError::object_not_found(describe(identifiers)))?;

        let mut object = store.objects[index].clone();
        if let Some(names) = attributes_to_return {
            object.attributes = object.attributes.project(names);
        }
        Ok(object)
    }

    async fn find(
        &self,
        object_class: &ResourceObjectDefinition,
        query: Option<&Filter>,
        handler: &mut dyn ResultHandler,
    ) -> ConnectorResult<()> {
        self.lifecycle.mark_active().await?;
        let store = self.store.read().await;
        let matching = store.objects.iter().filter(|o| {
            &o.object_class == object_class.name()
                && query.map_or(true, |filter| filter.matches(&o.attributes))
        });
        for object in matching {
            if handler.handle(object.clone()).should_stop() {
                debug!("Search stopped by handler");
                break;
            }
        }
        Ok(())
    }

    async fn add(
        &self,
        object_class: &ResourceObjectDefinition,
        object: &ResourceObject,
        additional_operations: &[AdditionalOperation],
        result: &mut OperationResult,
    ) -> ConnectorResult<AttributeReport> {
        self.lifecycle.mark_active().await?;
        Self::check_class(object_class, object)?;
        Self::check_scripts(additional_operations)?;

        let identifiers = object.identifiers_from(object_class);
        if identifiers.len() != object_class.identifier_names().len() {
            return Err(ConnectorError::schema("object is missing identifier values"));
        }

        let mut store = self.store.write().await;
        if store.position(object_class.name(), &identifiers).is_some() {
            return Err(ConnectorError::object_already_exists(describe(&identifiers)));
        }
        self.run_scripts(additional_operations, ScriptTiming::Before, result)
            .await;
        store.objects.push(object.clone());
        store.record(
            object_class.name(),
            identifiers.clone(),
            ChangeType::Create,
            Some(object.clone()),
        );
        self.run_scripts(additional_operations, ScriptTiming::After, result)
            .await;
        Ok(AttributeReport::Reported(identifiers))
    }

    async fn modify(
        &self,
        object_class: &ResourceObjectDefinition,
        identifiers: &AttributeSet,
        modifications: &[AttributeModification],
        additional_operations: &[AdditionalOperation],
        result: &mut OperationResult,
    ) -> ConnectorResult<AttributeReport> {
        self.lifecycle.mark_active().await?;
        let unknown = modifications
            .iter()
            .find(|m| object_class.find_attribute_definition(m.attribute()).is_none());
        if let Some(m) = unknown {
            return Err(ConnectorError::schema(format!(
                "unknown attribute {}",
                m.attribute()
            )));
        }
        Self::check_scripts(additional_operations)?;

        let mut store = self.store.write().await;
        let index = store
            .position(object_class.name(), identifiers)
            .ok_or_else(|| ConnectorError::object_not_found(describe(identifiers)))?;
        self.run_scripts(additional_operations, ScriptTiming::Before, result)
            .await;
        for modification in modifications {
            store.objects[index].attributes.apply(modification);
        }
        let current = store.objects[index].clone();
        store.record(
            object_class.name(),
            identifiers.clone(),
            ChangeType::Update,
            Some(current),
        );
        self.run_scripts(additional_operations, ScriptTiming::After, result)
            .await;
        Ok(AttributeReport::NotSupported)
    }

    async fn delete(
        &self,
        object_class: &ResourceObjectDefinition,
        identifiers: &AttributeSet,
        additional_operations: &[AdditionalOperation],
        result: &mut OperationResult,
    ) -> ConnectorResult<()> {
        self.lifecycle.mark_active().await?;
        Self::check_scripts(additional_operations)?;

        let mut store = self.store.write().await;
        let index = store
            .position(object_class.name(), identifiers)
            .ok_or_else(|| ConnectorError::object_not_found(describe(identifiers)))?;
        self.run_scripts(additional_operations, ScriptTiming::Before, result)
            .await;
        store.objects.remove(index);
        store.record(object_class.name(), identifiers.clone(), ChangeType::Delete, None);
        self.run_scripts(additional_operations, ScriptTiming::After, result)
            .await;
        Ok(())
    }

    async fn changes_after(
        &self,
        object_class: &ResourceObjectDefinition,
        last_token: Option<&Token>,
    ) -> ConnectorResult<Vec<Change>> {
        self.lifecycle.mark_active().await?;
        let after = match last_token {
            None => 0,
            Some(token) => token.sequence().ok_or_else(|| {
                ConnectorError::generic_framework("token was not issued by this connector")
            })?,
        };

        let store = self.store.read().await;
        Ok(store
            .changes
            .iter()
            .filter(|(sequence, change)| {
                *sequence > after && &change.object_class == object_class.name()
            })
            .map(|(_, change)| change.clone())
            .collect())
    }
}

fn describe(identifiers: &AttributeSet) -> String {
    identifiers
        .iter()
        .map(|(name, value)| format!("{}={}", name.local_name(), value.as_strings().join(",")))
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl ConnectorInstance for MemoryConnector {
    async fn configure(
        &self,
        configuration: &serde_json::Value,
        result: &mut OperationResult,
    ) -> ConnectorResult<()> {
        let result = result.create_subresult("configure");
        let config: MemoryConfig = result.finish(parse_config(configuration))?;
        debug!(config = ?config.redacted(), "Configuring memory connector");
        *self.config.write().await = Some(config);
        *self.schema.write().await = None;
        self.lifecycle.mark_configured().await;
        Ok(())
    }

    async fn initialize(&self, result: &mut OperationResult) -> ConnectorResult<()> {
        let result = result.create_subresult("initialize");
        let outcome = self.initialize_with(result).await;
        result.finish(outcome)
    }

    async fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.state().await
    }

    async fn capabilities(
        &self,
        result: &mut OperationResult,
    ) -> ConnectorResult<Option<Vec<Capability>>> {
        let result = result.create_subresult("capabilities");
        let outcome = self.lifecycle.ensure_initialized().await.map(|()| {
            Some(vec![
                Capability::Create,
                Capability::Read,
                Capability::Update,
                Capability::Delete,
                Capability::Search,
                Capability::LiveSync,
                Capability::TestConnection,
                Capability::Script,
            ])
        });
        result.finish(outcome)
    }

    async fn resource_schema(
        &self,
        result: &mut OperationResult,
    ) -> ConnectorResult<Option<Schema>> {
        let result = result.create_subresult("resource_schema");
        let outcome = match self.lifecycle.ensure_initialized().await {
            Ok(()) => Ok(self.schema.read().await.clone()),
            Err(e) => Err(e),
        };
        result.finish(outcome)
    }

    async fn fetch_object(
        &self,
        object_class: &ResourceObjectDefinition,
        identifiers: &AttributeSet,
        attributes_to_return: Option<&[QName]>,
        result: &mut OperationResult,
    ) -> ConnectorResult<ResourceObject> {
        let result = result.create_subresult("fetch_object");
        let outcome = self
            .fetch(object_class, identifiers, attributes_to_return)
            .await;
        result.finish(outcome)
    }

    async fn search(
        &self,
        object_class: &ResourceObjectDefinition,
        query: Option<&Filter>,
        handler: &mut dyn ResultHandler,
        result: &mut OperationResult,
    ) -> ConnectorResult<()> {
        let result = result.create_subresult("search");
        let outcome = self.find(object_class, query, handler).await;
        result.finish(outcome)
    }

    async fn add_object(
        &self,
        object_class: &ResourceObjectDefinition,
        object: &ResourceObject,
        additional_operations: &[AdditionalOperation],
        result: &mut OperationResult,
    ) -> ConnectorResult<AttributeReport> {
        let result = result.create_subresult("add_object");
        let outcome = self
            .add(object_class, object, additional_operations, result)
            .await;
        result.finish(outcome)
    }

    async fn modify_object(
        &self,
        object_class: &ResourceObjectDefinition,
        identifiers: &AttributeSet,
        modifications: &[AttributeModification],
        additional_operations: &[AdditionalOperation],
        result: &mut OperationResult,
    ) -> ConnectorResult<AttributeReport> {
        let result = result.create_subresult("modify_object");
        let outcome = self
            .modify(
                object_class,
                identifiers,
                modifications,
                additional_operations,
                result,
            )
            .await;
        result.finish(outcome)
    }

    async fn delete_object(
        &self,
        object_class: &ResourceObjectDefinition,
        identifiers: &AttributeSet,
        additional_operations: &[AdditionalOperation],
        result: &mut OperationResult,
    ) -> ConnectorResult<()> {
        let result = result.create_subresult("delete_object");
        let outcome = self
            .delete(object_class, identifiers, additional_operations, result)
            .await;
        result.finish(outcome)
    }

    async fn fetch_current_token(
        &self,
        _object_class: &ResourceObjectDefinition,
        result: &mut OperationResult,
    ) -> ConnectorResult<Token> {
        let result = result.create_subresult("fetch_current_token");
        let outcome = match self.lifecycle.mark_active().await {
            Ok(()) => Ok(Token::from_sequence(self.store.read().await.sequence)),
            Err(e) => Err(e),
        };
        result.finish(outcome)
    }

    async fn fetch_changes(
        &self,
        object_class: &ResourceObjectDefinition,
        last_token: Option<&Token>,
        result: &mut OperationResult,
    ) -> ConnectorResult<Vec<Change>> {
        let result = result.create_subresult("fetch_changes");
        let outcome = self.changes_after(object_class, last_token).await;
        result.finish(outcome)
    }

    /// Accepts the current base64 form and the older `seq:<n>` form.
    fn deserialize_token(&self, serialized: &str) -> ConnectorResult<Token> {
        match serialized.strip_prefix("seq:") {
            Some(legacy) => legacy
                .parse::<u64>()
                .map(Token::from_sequence)
                .map_err(|e| {
                    ConnectorError::generic_framework_with_source("invalid legacy token", e)
                }),
            None => Token::parse_serialized(serialized),
        }
    }

    async fn test(&self, result: &mut OperationResult) -> ConnectorResult<()> {
        self.lifecycle.ensure_configured().await?;
        let config = self.current_config().await?;

        result.create_subresult("configuration").record(&config.validate());
        let connected = self.connect(&config).await;
        result.create_subresult("connection").record(&connected);
        result.compute_status();
        Ok(())
    }
}

/// A configured and initialized memory connector with the account class.
pub async fn ready_connector() -> (MemoryConnector, ResourceObjectDefinition) {
    init_test_logging();
    let connector = MemoryConnector::new();
    let mut result = OperationResult::new("setup");
    connector
        .configure(&memory_config(), &mut result)
        .await
        .unwrap();
    connector.initialize(&mut result).await.unwrap();

    let schema = connector.resource_schema(&mut result).await.unwrap().unwrap();
    let accounts = schema.default_account_definition().unwrap().clone();
    (connector, accounts)
}

pub fn account(uid: &str, name: &str) -> ResourceObject {
    ResourceObject::new(
        q("AccountObjectClass"),
        AttributeSet::new().with(q("uid"), uid).with(q("name"), name),
    )
}

pub fn uid(value: &str) -> AttributeSet {
    AttributeSet::new().with(q("uid"), value)
}
