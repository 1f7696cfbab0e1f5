//! Raw point queries.

use serde::de::DeserializeOwned;

use crate::codec::Codec;
use crate::error::ApiError;
use crate::gateway::Gateway;
use crate::http::{Endpoint, HttpMethod, Reply};
use crate::types::{NumberQueryResults, QueryResults, RawDataQuery, RawQueryType, TextQueryResults};

const RAW_QUERY_POST: Endpoint = Endpoint::new(HttpMethod::Post, "/api/query/raw");

impl<C: Codec> Gateway<C> {
    /// Raw numeric points matching `query`, or `None` when nothing matched.
    pub fn get_raw_points(&self, query: &RawDataQuery) -> Result<Option<NumberQueryResults>, ApiError> {
        self.raw_points(query, RawQueryType::Number)
    }

    /// Raw text points matching `query`, or `None` when nothing matched.
    pub fn get_raw_text_points(&self, query: &RawDataQuery) -> Result<Option<TextQueryResults>, ApiError> {
        self.raw_points(query, RawQueryType::Text)
    }

    fn raw_points<P>(&self, query: &RawDataQuery, query_type: RawQueryType) -> Result<Option<QueryResults<P>>, ApiError>
    where
        P: DeserializeOwned,
    {
        let body = query.typed(query_type);
        let reply = match self.execute::<_, QueryResults<P>>(&RAW_QUERY_POST, &[], Some(&body)) {
            Ok(reply) => reply,
            // error bodies are not result documents
            Err(ApiError::Unmarshal { status, .. }) if status != 200 => Reply { status, value: None },
            Err(err) => return Err(err),
        };
        match reply.status {
            // 204 leaves nothing decoded, which reads the same as total == 0
            200 | 204 => Ok(reply.value.filter(|results| !results.is_empty())),
            400 => Err(ApiError::BadRequest),
            status => Err(ApiError::UnexpectedStatus(status)),
        }
    }
}
