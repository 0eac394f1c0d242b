use crate::error::GatewayError;
use crate::model::modifier::{Modifier, ModifierAction, ModifierTarget};
use crate::model::request::Request;
use crate::model::status_code::StatusCode;
use crate::resolver::Resolver;

use super::{target_name, unsupported, Modifiable};

impl Modifiable for StatusCode {
    const TARGET: ModifierTarget = ModifierTarget::StatusCode;

    fn modify(
        &self,
        modifier: &Modifier,
        resolver: &Resolver,
        warnings: &mut Vec<GatewayError>,
    ) -> Result<Self, GatewayError> {
        match modifier.action {
            ModifierAction::Set | ModifierAction::Add | ModifierAction::Replace => {
                let (value, errors) = resolver.get(&modifier.value);
                warnings.extend(errors);
                match value.trim().parse::<u16>() {
                    Ok(code) if (100..=599).contains(&code) => Ok(StatusCode::new(code)),
                    _ => Err(GatewayError::invalid_modifier(
                        target_name(Self::TARGET),
                        modifier.action,
                        &modifier.key,
                        format!("{value:?} is not a status code"),
                    )),
                }
            }
            ModifierAction::Del | ModifierAction::Rename => Err(unsupported::<Self>(modifier)),
        }
    }

    /// Requests carry no status code.
    fn from_request(_request: &Request) -> Option<Self> {
        None
    }

    fn into_request(self, request: &Request) -> Request {
        request.clone()
    }
}
