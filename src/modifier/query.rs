use crate::error::GatewayError;
use crate::model::modifier::{Modifier, ModifierAction, ModifierTarget};
use crate::model::query::Query;
use crate::model::request::Request;
use crate::resolver::Resolver;

use super::{unsupported, Modifiable};

impl Modifiable for Query {
    const TARGET: ModifierTarget = ModifierTarget::Query;

    fn modify(
        &self,
        modifier: &Modifier,
        resolver: &Resolver,
        warnings: &mut Vec<GatewayError>,
    ) -> Result<Self, GatewayError> {
        let key = modifier.key.as_str();
        match modifier.action {
            ModifierAction::Set => {
                let (values, errors) = resolver.get_as_slice_of_string(&modifier.value);
                warnings.extend(errors);
                Ok(self.set_all(key, values))
            }
            ModifierAction::Add => {
                let (values, errors) = resolver.get_as_slice_of_string(&modifier.value);
                warnings.extend(errors);
                Ok(self.add_all(key, values))
            }
            ModifierAction::Del => Ok(self.del(key)),
            ModifierAction::Rename => {
                let (to, errors) = resolver.get(&modifier.value);
                warnings.extend(errors);
                Ok(self.rename(key, &to))
            }
            ModifierAction::Replace => Err(unsupported::<Self>(modifier)),
        }
    }

    fn from_request(request: &Request) -> Option<Self> {
        Some(request.query().clone())
    }

    fn into_request(self, request: &Request) -> Request {
        request.with_query(self)
    }
}
