//! Decoration and invocation of ghostfunctions

use crate::annotation::TypeDescriptor;
use crate::error::{ContractRequirement, GhostError, Result};
use crate::function::{CallArgs, FunctionDescriptor, Signature};
use crate::interpreter::{interpret, Aggregator, FirstChoice};
use crate::prompt::{PromptBuilder, ReplPrompt};
use crate::providers::{CompletionBackend, CompletionOptions, OpenAIBackend};
use crate::value::Value;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Decorate `descriptor` with the default backend built from the environment
pub fn ghostfunction(descriptor: FunctionDescriptor) -> Result<GhostFunction> {
    GhostFunction::builder().decorate(descriptor)
}

/// Decorate `descriptor` with an injected backend
pub fn ghostfunction_with<B>(backend: B, descriptor: FunctionDescriptor) -> Result<GhostFunction>
where
    B: CompletionBackend + 'static,
{
    GhostFunction::builder().backend(backend).decorate(descriptor)
}

struct Inner {
    descriptor: FunctionDescriptor,
    returns: TypeDescriptor,
    backend: Arc<dyn CompletionBackend>,
    prompt: Arc<dyn PromptBuilder>,
    aggregator: Arc<dyn Aggregator>,
    options: CompletionOptions,
    unquote_text: bool,
}

/// A function whose body is a completion request
///
/// Cheap to clone; clones share their configuration and may be called
/// concurrently.
#[derive(Clone)]
pub struct GhostFunction {
    inner: Arc<Inner>,
}

impl GhostFunction {
    /// Start configuring how ghostfunctions are built
    pub fn builder() -> GhostBuilder {
        GhostBuilder::default()
    }

    /// Name of the wrapped function
    pub fn name(&self) -> &str {
        self.inner.descriptor.name()
    }

    /// Docstring of the wrapped function
    pub fn docstring(&self) -> &str {
        self.inner.descriptor.docstring().unwrap_or_default()
    }

    /// Signature of the wrapped function, unchanged by decoration
    pub fn signature(&self) -> &Signature {
        self.inner.descriptor.signature()
    }

    /// The validated function contract
    pub fn descriptor(&self) -> &FunctionDescriptor {
        &self.inner.descriptor
    }

    /// Declared return type replies are checked against
    pub fn return_type(&self) -> &TypeDescriptor {
        &self.inner.returns
    }

    /// Passthrough options sent with every call
    pub fn options(&self) -> &CompletionOptions {
        &self.inner.options
    }

    /// Call the function and return the validated value
    pub async fn call(&self, args: CallArgs) -> Result<Value> {
        let inner = &*self.inner;
        let bound = inner.descriptor.bind(args)?;
        let messages = inner.prompt.build(&inner.descriptor, &bound);
        debug!(
            function = %self.name(),
            messages = messages.len(),
            "built prompt"
        );

        info!(
            function = %self.name(),
            backend = %inner.backend.name(),
            "calling ghostfunction"
        );
        let result = inner.backend.complete(messages, &inner.options).await?;
        interpret(
            &result,
            &inner.returns,
            inner.aggregator.as_ref(),
            inner.unquote_text,
        )
    }

    /// Call the function and decode the value into a Rust type
    pub async fn call_as<T: DeserializeOwned>(&self, args: CallArgs) -> Result<T> {
        let value = self.call(args).await?;
        let found = value.type_name();
        value.decode().map_err(|e| GhostError::TypeValidation {
            expected: std::any::type_name::<T>().to_string(),
            found: format!("{} ({})", found, e),
            path: "$".to_string(),
        })
    }

    /// Call the function from synchronous code
    ///
    /// Runs the call on a private current-thread runtime. Inside an async
    /// context this returns [`GhostError::Runtime`]; use [`call`](Self::call)
    /// there instead.
    pub fn call_blocking(&self, args: CallArgs) -> Result<Value> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(GhostError::Runtime(format!(
                "{}() was called with call_blocking from within an async runtime",
                self.name()
            )));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| GhostError::Runtime(format!("failed to start runtime: {}", e)))?;
        runtime.block_on(self.call(args))
    }
}

impl fmt::Debug for GhostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GhostFunction")
            .field("name", &self.name())
            .field("signature", &self.signature().to_string())
            .field("backend", &self.inner.backend.name())
            .field("options", &self.inner.options)
            .field("unquote_text", &self.inner.unquote_text)
            .finish()
    }
}

/// Configures how ghostfunctions are built
///
/// Unset parts fall back to the defaults: an OpenAI backend from the
/// environment, [`ReplPrompt`] and [`FirstChoice`]. A builder can decorate
/// any number of descriptors.
#[derive(Clone)]
pub struct GhostBuilder {
    backend: Option<Arc<dyn CompletionBackend>>,
    prompt: Arc<dyn PromptBuilder>,
    aggregator: Arc<dyn Aggregator>,
    options: CompletionOptions,
    unquote_text: bool,
}

impl Default for GhostBuilder {
    fn default() -> Self {
        Self {
            backend: None,
            prompt: Arc::new(ReplPrompt),
            aggregator: Arc::new(FirstChoice),
            options: CompletionOptions::new(),
            unquote_text: false,
        }
    }
}

impl GhostBuilder {
    /// Use `backend` instead of the default OpenAI backend
    pub fn backend<B: CompletionBackend + 'static>(mut self, backend: B) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    /// Use a backend already shared with other functions
    pub fn shared_backend(mut self, backend: Arc<dyn CompletionBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Replace the default [`ReplPrompt`]
    pub fn prompt<P: PromptBuilder + 'static>(mut self, prompt: P) -> Self {
        self.prompt = Arc::new(prompt);
        self
    }

    /// Replace the default [`FirstChoice`] aggregation
    pub fn aggregation<A: Aggregator + 'static>(mut self, aggregator: A) -> Self {
        self.aggregator = Arc::new(aggregator);
        self
    }

    /// Add one passthrough option, e.g. `option("temperature", 0.2)`
    pub fn option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Add several passthrough options, replacing existing keys
    pub fn options(mut self, options: CompletionOptions) -> Self {
        self.options.extend(options);
        self
    }

    /// Strip one layer of matching quotes from `str` replies
    pub fn unquote_text(mut self, unquote_text: bool) -> Self {
        self.unquote_text = unquote_text;
        self
    }

    /// Validate `descriptor` and wrap it into a [`GhostFunction`]
    ///
    /// The contract is checked before any backend is created, so a missing
    /// docstring or return type is reported even without credentials.
    pub fn decorate(&self, descriptor: FunctionDescriptor) -> Result<GhostFunction> {
        descriptor.validate()?;
        let returns = descriptor.return_type().cloned().ok_or_else(|| {
            GhostError::contract(descriptor.name(), ContractRequirement::ReturnAnnotation)
        })?;

        let backend: Arc<dyn CompletionBackend> = match &self.backend {
            Some(backend) => Arc::clone(backend),
            None => Arc::new(OpenAIBackend::from_env()?),
        };

        debug!(
            function = %descriptor.name(),
            signature = %descriptor.signature(),
            backend = %backend.name(),
            "decorated ghostfunction"
        );

        Ok(GhostFunction {
            inner: Arc::new(Inner {
                descriptor,
                returns,
                backend,
                prompt: Arc::clone(&self.prompt),
                aggregator: Arc::clone(&self.aggregator),
                options: self.options.clone(),
                unquote_text: self.unquote_text,
            }),
        })
    }
}

impl fmt::Debug for GhostBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GhostBuilder")
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .field("options", &self.options)
            .field("unquote_text", &self.unquote_text)
            .finish()
    }
}
