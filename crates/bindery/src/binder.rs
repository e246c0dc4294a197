//! The binding orchestrator.

use std::sync::Arc;

use bindery_http::{FormValues, Request};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{BinderConfig, BodyMode};
use crate::error::{BindError, BindResult};
use crate::logger::{Logger, NoopLogger};
use crate::merge::{merge_json, snapshot};
use crate::resolve::ValueResolver;
use crate::schema::Record;
use crate::walker::FieldWalker;

/// Result of a successful [`Binder::unpack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No destination was given; nothing was read or written.
    Skipped,
    /// The destination was bound; `assigned` leaves came from path or
    /// form values.
    Bound { assigned: usize },
}

/// Binds one inbound request onto destination records.
///
/// The body is read at most once per request, so a second `unpack` against
/// the same request fails with [`BindError::BodyRead`].
pub struct Binder<'r> {
    request: &'r mut Request,
    config: BinderConfig,
    logger: Arc<dyn Logger>,
}

impl<'r> Binder<'r> {
    pub fn new(request: &'r mut Request) -> Self {
        Self {
            request,
            config: BinderConfig::default(),
            logger: Arc::new(NoopLogger),
        }
    }

    pub fn with_config(mut self, config: BinderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    pub fn request(&self) -> &Request {
        self.request
    }

    /// Fill `destination` from the request.
    ///
    /// The body goes first: a form-encoded body joins the form values, any
    /// other non-empty body is deep-merged onto the destination as JSON.
    /// The field walk then applies path and form values over it.
    ///
    /// Without [`BinderConfig::atomic`] a walk failure leaves the fields
    /// assigned before it in place.
    pub async fn unpack<T>(&mut self, destination: Option<&mut T>) -> BindResult<Outcome>
    where
        T: Record + Serialize + DeserializeOwned,
    {
        let Some(destination) = destination else {
            self.logger.debug(format_args!("no destination, skipping"));
            return Ok(Outcome::Skipped);
        };
        let type_name = destination.schema().type_name();

        let decoded = match self.read_body().await {
            Ok(body) => self.apply_body(destination, body),
            Err(e) => Err(e),
        };
        let decoded = decoded.inspect_err(|e| {
            self.logger.error(format_args!("binding {type_name}: {e}"));
        })?;

        let result = if self.config.atomic {
            self.bind_atomic(destination, decoded)
        } else {
            if let Some(merged) = decoded {
                *destination = merged;
            }
            self.walk(destination)
        };

        match result {
            Ok(assigned) => {
                self.logger
                    .info(format_args!("bound {type_name}: {assigned} field(s) from path/form"));
                Ok(Outcome::Bound { assigned })
            }
            Err(e) => {
                self.logger.error(format_args!("binding {type_name}: {e}"));
                Err(e)
            }
        }
    }

    async fn read_body(&mut self) -> BindResult<Option<Bytes>> {
        let body = self.request.take_body()?.collect().await?;
        match (&body, self.config.body) {
            (None, BodyMode::Required) => Err(BindError::MissingBody),
            _ => Ok(body),
        }
    }

    /// Returns the JSON-merged copy of `destination`, if the body was JSON.
    fn apply_body<T>(&mut self, destination: &T, body: Option<Bytes>) -> BindResult<Option<T>>
    where
        T: Record + Serialize + DeserializeOwned,
    {
        let Some(body) = body.filter(|b| !b.is_empty()) else {
            return Ok(None);
        };
        if self.request.is_form_encoded() {
            let form = FormValues::parse(&body);
            self.logger
                .debug(format_args!("form body: {} value(s)", form.len()));
            self.request.set_body_form(form);
            return Ok(None);
        }
        self.logger
            .debug(format_args!("json body: {} byte(s)", body.len()));
        Ok(Some(merge_json(destination, &body)?))
    }

    fn bind_atomic<T>(&self, destination: &mut T, decoded: Option<T>) -> BindResult<usize>
    where
        T: Record + Serialize + DeserializeOwned,
    {
        let mut scratch = match decoded {
            Some(merged) => merged,
            None => snapshot(destination)?,
        };
        let assigned = self.walk(&mut scratch)?;
        *destination = scratch;
        Ok(assigned)
    }

    fn walk(&self, record: &mut dyn Record) -> BindResult<usize> {
        let resolver = ValueResolver::from_request(self.request);
        let mut walker = FieldWalker::new(resolver, &self.config, self.logger.as_ref());
        walker.walk(record)?;
        Ok(walker.assigned())
    }
}
