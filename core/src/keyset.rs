//! Keyset listing and existence checks.

use crate::codec::Codec;
use crate::error::ApiError;
use crate::gateway::{Gateway, NO_BODY};
use crate::http::{Endpoint, HttpMethod, Reply};

const KEYSETS_GET: Endpoint = Endpoint::new(HttpMethod::Get, "/keysets");
const KEYSET_HEAD: Endpoint = Endpoint::with_parameters(HttpMethod::Head, "/keyset/{}");

impl<C: Codec> Gateway<C> {
    /// Every keyset known to the service. A 204 yields an empty list.
    pub fn get_keysets(&self) -> Result<Vec<String>, ApiError> {
        let reply = match self.execute::<_, Vec<String>>(&KEYSETS_GET, &[], NO_BODY) {
            Ok(reply) => reply,
            Err(ApiError::Unmarshal { status, .. }) if status != 200 => Reply { status, value: None },
            Err(err) => return Err(err),
        };
        match reply.status {
            200 | 204 => Ok(reply.into_value_or_default()),
            status => Err(ApiError::UnexpectedStatus(status)),
        }
    }

    pub fn keyset_exists(&self, keyset: &str) -> Result<bool, ApiError> {
        match self.send(&KEYSET_HEAD, &[keyset], NO_BODY)? {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(ApiError::UnexpectedStatus(status)),
        }
    }
}
