use crate::error::GatewayError;
use crate::model::header::Header;
use crate::model::modifier::{Modifier, ModifierAction, ModifierTarget};
use crate::model::request::Request;
use crate::resolver::Resolver;

use super::{unsupported, Modifiable};

impl Modifiable for Header {
    const TARGET: ModifierTarget = ModifierTarget::Header;

    fn modify(
        &self,
        modifier: &Modifier,
        resolver: &Resolver,
        warnings: &mut Vec<GatewayError>,
    ) -> Result<Self, GatewayError> {
        let key = modifier.key.as_str();
        match modifier.action {
            ModifierAction::Set | ModifierAction::Add => {
                let (values, errors) = resolver.get_as_slice_of_string(&modifier.value);
                warnings.extend(errors);
                Ok(if modifier.action == ModifierAction::Set {
                    self.set_all(key, values)
                } else {
                    self.add_all(key, values)
                })
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
        Some(request.header().clone())
    }

    fn into_request(self, request: &Request) -> Request {
        request.with_header(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::history::History;
    use crate::model::modifier::ModifierContext;
    use crate::model::params::Params;

    fn modifier(action: ModifierAction, key: &str, value: &str) -> Modifier {
        Modifier {
            context: ModifierContext::Request,
            scope: None,
            action,
            propagate: false,
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    fn resolver() -> Resolver {
        let request = Request::new(
            "GET",
            "/?ids=1&ids=2",
            "",
            Header::new().set("X-Id", "9"),
            Params::new(),
            None,
        );
        Resolver::new(&request, &History::new())
    }

    #[test]
    fn test_set_add_del_rename() {
        let resolver = resolver();
        let mut warnings = Vec::new();
        let header = Header::new().set("X-A", "old");

        let set = header
            .modify(&modifier(ModifierAction::Set, "X-A", "#request.header.X-Id"), &resolver, &mut warnings)
            .unwrap();
        assert_eq!(set.get_all("X-A"), ["9"]);

        let added = header
            .modify(&modifier(ModifierAction::Add, "X-A", "#request.query.ids"), &resolver, &mut warnings)
            .unwrap();
        assert_eq!(added.get_all("X-A"), ["old", "1", "2"]);

        let deleted = header
            .modify(&modifier(ModifierAction::Del, "x-a", ""), &resolver, &mut warnings)
            .unwrap();
        assert!(!deleted.exists("X-A"));

        let renamed = header
            .modify(&modifier(ModifierAction::Rename, "X-A", "X-B"), &resolver, &mut warnings)
            .unwrap();
        assert_eq!(renamed.get("X-B"), Some("old"));
        assert!(warnings.is_empty());
        assert_eq!(header.get("X-A"), Some("old"));
    }

    #[test]
    fn test_replace_is_invalid() {
        let result = Header::new().modify(
            &modifier(ModifierAction::Replace, "X-A", "1"),
            &resolver(),
            &mut Vec::new(),
        );
        assert!(matches!(result, Err(GatewayError::InvalidModifier { .. })));
    }
}
