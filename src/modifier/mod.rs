//! Modifier engine: SET / ADD / DEL / REPLACE / RENAME over header, path
//! params, query, body and status code.
//!
//! # Data Flow
//! ```text
//! build_request:  modifiers(context = REQUEST)
//!     scope REQUEST  → backend request        (+ inbound Request if propagate)
//!     scope RESPONSE → recorded on the endpoint Response
//! build_response: modifiers(context = RESPONSE)
//!     scope RESPONSE → backend response       (+ recorded on Response if propagate)
//!     scope REQUEST  → inbound Request, seen by the following backends
//! ```
//!
//! # Design Decisions
//! - One `Modifiable` impl per target type, each matching every action
//!   exhaustively; unsupported actions are `InvalidModifier` errors
//! - A failed modifier leaves its target untouched and execution continues
//! - Values recorded on the endpoint Response are evaluated up front so
//!   they reflect the history at the time the backend ran

mod body;
mod header;
mod params;
mod query;
mod status_code;

pub use params::PathParams;

use tracing::debug;

use crate::error::GatewayError;
use crate::model::modifier::{Modifier, ModifierContext, ModifierScope, ModifierTarget};
use crate::model::request::Request;
use crate::model::response::Response;
use crate::resolver::Resolver;

/// A value a modifier can edit.
pub trait Modifiable: Sized + Clone {
    const TARGET: ModifierTarget;

    /// Apply one modifier. Resolution misses go to `warnings`; the edit
    /// still happens with the unresolved text.
    fn modify(
        &self,
        modifier: &Modifier,
        resolver: &Resolver,
        warnings: &mut Vec<GatewayError>,
    ) -> Result<Self, GatewayError>;

    /// The matching field of the inbound request, if it has one.
    fn from_request(request: &Request) -> Option<Self>;

    /// Write the value back onto the inbound request.
    fn into_request(self, request: &Request) -> Request;

    fn supports(_scope: ModifierScope) -> bool {
        true
    }
}

/// Result of running one modifier list.
#[derive(Debug)]
pub struct Outcome<T> {
    pub local: T,
    pub request: Request,
    pub response: Response,
    pub errors: Vec<GatewayError>,
}

fn phase_scope(phase: ModifierContext) -> ModifierScope {
    match phase {
        ModifierContext::Request => ModifierScope::Request,
        ModifierContext::Response => ModifierScope::Response,
    }
}

/// Run the modifiers of `phase` in order against the backend-local value and
/// the endpoint-global request and response.
pub fn execute<T: Modifiable>(
    modifiers: &[Modifier],
    phase: ModifierContext,
    local: T,
    request: Request,
    response: Response,
    resolver: &Resolver,
) -> Outcome<T> {
    let mut outcome = Outcome {
        local,
        request,
        response,
        errors: Vec::new(),
    };

    for modifier in modifiers.iter().filter(|m| m.context == phase) {
        if !modifier.is_valid() {
            debug!(target_field = %T::TARGET, key = %modifier.key, "skipping modifier without value");
            continue;
        }
        let scope = modifier.scope();
        if !T::supports(scope) {
            outcome.errors.push(GatewayError::invalid_modifier(
                target_name(T::TARGET),
                modifier.action,
                &modifier.key,
                format!("{scope:?} scope is not supported"),
            ));
            continue;
        }

        let local_scope = scope == phase_scope(phase);
        if local_scope {
            match outcome.local.modify(modifier, resolver, &mut outcome.errors) {
                Ok(local) => outcome.local = local,
                Err(err) => {
                    outcome.errors.push(err);
                    continue;
                }
            }
        }

        match scope {
            ModifierScope::Request if modifier.propagate || !local_scope => {
                if let Some(err) = modify_request::<T>(&mut outcome.request, modifier, resolver, &mut outcome.errors) {
                    outcome.errors.push(err);
                }
            }
            ModifierScope::Response if modifier.propagate || !local_scope => {
                let evaluated = if modifier.value.is_empty() {
                    modifier.clone()
                } else {
                    let (value, errors) = resolver.get(&modifier.value);
                    outcome.errors.extend(errors);
                    modifier.with_value(value)
                };
                outcome.response = outcome.response.propagate(T::TARGET, evaluated);
            }
            _ => {}
        }
    }

    outcome
}

fn modify_request<T: Modifiable>(
    request: &mut Request,
    modifier: &Modifier,
    resolver: &Resolver,
    warnings: &mut Vec<GatewayError>,
) -> Option<GatewayError> {
    let Some(current) = T::from_request(request) else {
        return Some(GatewayError::invalid_modifier(
            target_name(T::TARGET),
            modifier.action,
            &modifier.key,
            "the inbound request has no such field",
        ));
    };
    match current.modify(modifier, resolver, warnings) {
        Ok(modified) => {
            *request = modified.into_request(request);
            None
        }
        Err(err) => Some(err),
    }
}

/// Apply an already-recorded modifier outside of a phase.
pub fn apply<T: Modifiable>(
    value: &T,
    modifier: &Modifier,
    resolver: &Resolver,
    warnings: &mut Vec<GatewayError>,
) -> Result<T, GatewayError> {
    value.modify(modifier, resolver, warnings)
}

pub(crate) fn target_name(target: ModifierTarget) -> &'static str {
    match target {
        ModifierTarget::Header => "header",
        ModifierTarget::Params => "param",
        ModifierTarget::Query => "query",
        ModifierTarget::Body => "body",
        ModifierTarget::StatusCode => "status-code",
    }
}

pub(crate) fn unsupported<T: Modifiable>(modifier: &Modifier) -> GatewayError {
    GatewayError::invalid_modifier(
        target_name(T::TARGET),
        modifier.action,
        &modifier.key,
        "action is not supported for this target",
    )
}
