use stash_core::Store;
use stash_proto::stash_server::Stash;
use stash_proto::{GetRequest, GetResponse, SetRequest, SetResponse};
use tonic::{Request, Response, Status};

/// Maximum allowed key length (1 KB)
const MAX_KEY_LENGTH: usize = 1024;

/// Maximum allowed value length (1 MB)
const MAX_VALUE_LENGTH: usize = 1024 * 1024;

/// Truncates a key for safe logging (prevents leaking sensitive key data)
fn truncate_key_for_log(key: &str) -> String {
    const MAX_LOG_LEN: usize = 16;
    if key.len() <= MAX_LOG_LEN {
        key.to_string()
    } else {
        format!("{}...", &key[..MAX_LOG_LEN])
    }
}

/// Validates that a key is within size limits
fn validate_key(key: &str) -> Result<(), Status> {
    if key.is_empty() {
        return Err(Status::invalid_argument("Key cannot be empty"));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(Status::invalid_argument(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

/// Validates that a value is within size limits
fn validate_value(value: &str) -> Result<(), Status> {
    if value.len() > MAX_VALUE_LENGTH {
        return Err(Status::invalid_argument(format!(
            "Value exceeds maximum length of {} bytes",
            MAX_VALUE_LENGTH
        )));
    }
    Ok(())
}

/// The gRPC service implementation
///
/// A thin adapter: requests are translated into `Store::get`/`Store::set`
/// calls and results into responses. All state lives in the store.
pub struct StashService {
    store: Store,
}

impl StashService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[tonic::async_trait]
impl Stash for StashService {
    async fn get(&self, request: Request<GetRequest>) -> Result<Response<GetResponse>, Status> {
        let key = &request.get_ref().key;
        validate_key(key)?;
        tracing::debug!("GET {}", truncate_key_for_log(key));

        // Absent and expired keys are reported identically: no value
        let value = self.store.get(key).map(|v| v.to_string());
        Ok(Response::new(GetResponse { value }))
    }

    async fn set(&self, request: Request<SetRequest>) -> Result<Response<SetResponse>, Status> {
        let req = request.get_ref();
        validate_key(&req.key)?;
        validate_value(&req.value)?;

        let ttl_display = if req.ttl_seconds <= 0 {
            "never".to_string()
        } else {
            format!("{}s", req.ttl_seconds)
        };
        tracing::debug!("SET {} (ttl: {})", truncate_key_for_log(&req.key), ttl_display);

        self.store.set(&req.key, &req.value, req.ttl_seconds);
        Ok(Response::new(SetResponse { success: true }))
    }
}
