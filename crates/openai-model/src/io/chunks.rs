#[cfg(test)]
use std::collections::VecDeque;

use bytes::Bytes;
use reqwest::Response;

/// The transport failed while pulling the next chunk.
#[derive(Debug, PartialEq, Eq)]
pub struct Error(pub(crate) String);

/// An adapter for streaming byte chunks.
///
/// Production responses pull from the HTTP body; tests feed a canned
/// queue of byte chunks so the SSE layer can be exercised offline.
pub enum Chunks {
    Response(Box<Response>),
    #[cfg(test)]
    VecDeque(VecDeque<Bytes>),
}

impl Chunks {
    pub fn from_response(response: Response) -> Self {
        Chunks::Response(Box::new(response))
    }

    #[cfg(test)]
    pub fn from_vec_deque(vec: VecDeque<Bytes>) -> Self {
        Chunks::VecDeque(vec)
    }

    #[inline]
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, Error> {
        match self {
            Chunks::Response(response) => response
                .chunk()
                .await
                .map_err(|err| Error(format!("{err}"))),
            #[cfg(test)]
            Chunks::VecDeque(vec) => Ok(vec.pop_front()),
        }
    }
}
