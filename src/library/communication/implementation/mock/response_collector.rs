use crate::library::communication::implementation::json::JsonResponseCollector;
use crate::library::communication::request::{
    RawResponseCollector, ResponseCollectionTimeout, ResponseLocation,
};
use crate::library::BoxedError;
use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use serde::Serialize;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("scripted reception failure")]
struct ScriptedReceptionFailure;

enum ScriptedFrame {
    Payload(Vec<u8>),
    ReceptionFailure,
}

/// Scripted [`ResponseCollector`](crate::library::communication::request::ResponseCollector)
/// replaying a fixed sequence of raw responses
///
/// The scripted frames are handed out regardless of the requested location; limits are
/// honored, timeouts are ignored. An exhausted script simply ends the stream — which,
/// for frame-based streaming calls, doubles as a responder dying mid-stream.
#[derive(Default)]
pub struct MockResponseCollector {
    scripted: Mutex<Vec<ScriptedFrame>>,
}

impl MockResponseCollector {
    /// Scripts a serialized response frame
    pub fn push<R: Serialize>(&self, response: &R) -> &Self {
        self.scripted
            .lock()
            .unwrap()
            .push(ScriptedFrame::Payload(serde_json::to_vec(response).unwrap()));
        self
    }

    /// Scripts a transport-level reception failure
    pub fn push_reception_failure(&self) -> &Self {
        self.scripted
            .lock()
            .unwrap()
            .push(ScriptedFrame::ReceptionFailure);
        self
    }
}

#[async_trait]
impl RawResponseCollector for MockResponseCollector {
    async fn collect_raw(
        &self,
        _location: ResponseLocation,
        limit: Option<usize>,
        _timeout: ResponseCollectionTimeout,
    ) -> Result<BoxStream<Result<Vec<u8>, BoxedError>>, BoxedError> {
        let mut scripted = std::mem::take(&mut *self.scripted.lock().unwrap());

        if let Some(limit) = limit {
            scripted.truncate(limit);
        }

        let frames: Vec<Result<Vec<u8>, BoxedError>> = scripted
            .into_iter()
            .map(|frame| match frame {
                ScriptedFrame::Payload(payload) => Ok(payload),
                ScriptedFrame::ReceptionFailure => Err(ScriptedReceptionFailure.into()),
            })
            .collect();

        Ok(stream::iter(frames).boxed())
    }
}

impl JsonResponseCollector for MockResponseCollector {}
