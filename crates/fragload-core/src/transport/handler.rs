//! Easy2 handler that buffers one fragment body.

/// Collects the response body of a fragment fetch. Bodies larger than
/// `max_bytes` abort the transfer.
pub struct FragmentBody {
    pub(super) body: Vec<u8>,
    pub(super) max_bytes: Option<usize>,
}

impl FragmentBody {
    pub fn new(max_bytes: Option<usize>) -> Self {
        Self {
            body: Vec::new(),
            max_bytes,
        }
    }

    pub fn take_body(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.body)
    }
}

impl curl::easy::Handler for FragmentBody {
    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        if let Some(max) = self.max_bytes {
            if self.body.len() + data.len() > max {
                tracing::warn!(max, "fragment body exceeds limit, aborting transfer");
                return Ok(0);
            }
        }
        self.body.extend_from_slice(data);
        Ok(data.len())
    }
}
