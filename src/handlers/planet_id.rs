use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::ApiError;

/// `:id` path segment restricted to `\d+` that fits the id column.
///
/// Anything else is treated exactly like a request no route matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanetId(pub i32);

impl PlanetId {
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        raw.parse().ok().map(PlanetId)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PlanetId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = Path::<String>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|Path(raw)| raw);

        raw.as_deref()
            .and_then(PlanetId::parse)
            .ok_or_else(|| ApiError::route_not_found(&parts.method, parts.uri.path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_digits_only() {
        assert_eq!(PlanetId::parse("23"), Some(PlanetId(23)));
        assert_eq!(PlanetId::parse("007"), Some(PlanetId(7)));
        assert_eq!(PlanetId::parse("asdf"), None);
        assert_eq!(PlanetId::parse("-1"), None);
        assert_eq!(PlanetId::parse("+1"), None);
        assert_eq!(PlanetId::parse(""), None);
    }

    #[test]
    fn out_of_range_ids_do_not_match() {
        assert_eq!(PlanetId::parse("2147483647"), Some(PlanetId(i32::MAX)));
        assert_eq!(PlanetId::parse("2147483648"), None);
    }
}
