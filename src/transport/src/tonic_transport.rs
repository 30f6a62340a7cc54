// Copyright 2026 The firestore-mobile-core Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A concrete [`Transport`] implementation over `tonic`'s bidirectional
//! streaming gRPC client.
//!
//! The core state machine (`firestore-mobile-streaming`) depends only on the
//! [`Transport`]/[`RpcHandle`] traits; this module exists so the crate is
//! runnable end to end against a real HTTP/2 gRPC endpoint rather than a
//! pure set of traits. It carries raw [`Bytes`] frames, not typed protobuf
//! messages — wire (de)serialization is the `Serializer` boundary one layer
//! up, so the codec here is a pass-through rather than a `prost` codec.

use std::sync::{Arc, Mutex};

use bytes::{Buf, BufMut, Bytes};
use futures::Stream;
use http::HeaderMap;
use tonic::client::Grpc;
use tonic::codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder};
use tonic::transport::Channel;
use tonic::IntoStreamingRequest;

use firestore_mobile_gax::{Code, Error, Status};

use crate::buffered_writer::{BufferedWriter, DrainedItem};
use crate::transport::{CallbackTarget, Endpoint, RpcHandle, Transport};

/// A [`Transport`] that dials one `tonic::transport::Channel` per endpoint
/// and reuses it for every RPC created against that endpoint.
#[derive(Clone, Debug)]
pub struct TonicTransport {
    channel: Channel,
}

impl TonicTransport {
    /// Connects (lazily; `tonic::transport::Endpoint::connect_lazy` never
    /// blocks) a channel to `endpoint`.
    pub fn new(endpoint: &Endpoint) -> Result<Self, Error> {
        let scheme = if endpoint.ssl_enabled { "https" } else { "http" };
        let uri = format!("{scheme}://{}", endpoint.host);
        let channel = tonic::transport::Endpoint::from_shared(uri)
            .map_err(Error::transport)?
            .connect_lazy();
        Ok(Self { channel })
    }
}

impl Transport for TonicTransport {
    fn create_rpc(
        &self,
        _endpoint: &Endpoint,
        path: &'static str,
        writer: Arc<BufferedWriter>,
    ) -> Result<Box<dyn RpcHandle>, Error> {
        Ok(Box::new(TonicRpcHandle {
            client: Grpc::new(self.channel.clone()),
            path,
            writer,
            headers: HeaderMap::new(),
            token: String::new(),
            response_headers: Arc::new(Mutex::new(None)),
        }))
    }
}

/// One bidirectional RPC driven over `tonic`.
struct TonicRpcHandle {
    client: Grpc<Channel>,
    path: &'static str,
    writer: Arc<BufferedWriter>,
    headers: HeaderMap,
    token: String,
    response_headers: Arc<Mutex<Option<HeaderMap>>>,
}

impl RpcHandle for TonicRpcHandle {
    fn set_request_headers(&mut self, headers: HeaderMap) {
        self.headers = headers;
    }

    fn set_oauth2_access_token(&mut self, token: String) {
        self.token = token;
    }

    fn response_headers(&self) -> Option<HeaderMap> {
        self.response_headers.lock().unwrap().clone()
    }

    fn start(&mut self, callback_target: Arc<dyn CallbackTarget>) {
        let mut metadata_headers = self.headers.clone();
        if !self.token.is_empty() {
            let value = format!("Bearer {}", self.token);
            if let Ok(value) = http::HeaderValue::from_str(&value) {
                metadata_headers.insert(http::header::AUTHORIZATION, value);
            }
        }
        let metadata = tonic::metadata::MetadataMap::from_headers(metadata_headers);

        let path: http::uri::PathAndQuery = self
            .path
            .parse()
            .expect("RPC paths are fixed string constants, always valid");

        let mut client = self.client.clone();
        let writer = self.writer.clone();
        let response_headers = self.response_headers.clone();

        tokio::spawn(async move {
            if client.ready().await.is_err() {
                callback_target.writes_finished_with_error(Some(Error::transport(
                    TransportError("channel not ready".into()),
                )));
                return;
            }

            let outbound = outbound_stream(writer);
            let request = tonic::Request::from_parts(metadata, tonic::Extensions::default(), outbound);

            let response = match client.streaming(request.into_streaming_request(), path, BytesCodec).await {
                Ok(response) => response,
                Err(status) => {
                    callback_target.writes_finished_with_error(Some(map_tonic_status(status)));
                    return;
                }
            };

            *response_headers.lock().unwrap() = Some(response.metadata().clone().into_headers());

            let mut inbound = response.into_inner();
            loop {
                match inbound.message().await {
                    Ok(Some(bytes)) => callback_target.write_value(bytes),
                    Ok(None) => {
                        callback_target.writes_finished_with_error(None);
                        return;
                    }
                    Err(status) => {
                        callback_target.writes_finished_with_error(Some(map_tonic_status(status)));
                        return;
                    }
                }
            }
        });
    }

    fn finish_with_error(&mut self, err: Option<Error>) {
        self.writer.finish_with_error(err);
    }
}

fn outbound_stream(writer: Arc<BufferedWriter>) -> impl Stream<Item = Bytes> {
    futures::stream::unfold(writer, |writer| async move {
        match writer.next().await {
            DrainedItem::Frame(bytes) => Some((bytes, writer)),
            DrainedItem::Finished(_) => None,
        }
    })
}

/// Normalizes a `tonic`-domain error into the Firestore error domain (§7),
/// preserving the gRPC status code and message. `tonic::Code`'s numeric
/// values are defined to match the gRPC wire codes, the same space
/// [`Code`] mirrors, so the two enums line up one for one.
fn map_tonic_status(status: tonic::Status) -> Error {
    let code = match status.code() {
        tonic::Code::Ok => Code::Ok,
        tonic::Code::Cancelled => Code::Cancelled,
        tonic::Code::Unknown => Code::Unknown,
        tonic::Code::InvalidArgument => Code::InvalidArgument,
        tonic::Code::DeadlineExceeded => Code::DeadlineExceeded,
        tonic::Code::NotFound => Code::NotFound,
        tonic::Code::AlreadyExists => Code::AlreadyExists,
        tonic::Code::PermissionDenied => Code::PermissionDenied,
        tonic::Code::ResourceExhausted => Code::ResourceExhausted,
        tonic::Code::FailedPrecondition => Code::FailedPrecondition,
        tonic::Code::Aborted => Code::Aborted,
        tonic::Code::OutOfRange => Code::OutOfRange,
        tonic::Code::Unimplemented => Code::Unimplemented,
        tonic::Code::Internal => Code::Internal,
        tonic::Code::Unavailable => Code::Unavailable,
        tonic::Code::DataLoss => Code::DataLoss,
        tonic::Code::Unauthenticated => Code::Unauthenticated,
        // `tonic::Code` is non-exhaustive upstream; an unrecognized future
        // variant falls back to `Unknown`, matching `Code::from(i32)`.
        _ => Code::Unknown,
    };
    Error::rpc(Status::new(code, status.message().to_string()))
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct TransportError(String);

/// A `tonic` codec carrying opaque byte frames instead of `prost` messages.
#[derive(Clone, Default)]
struct BytesCodec;

impl Codec for BytesCodec {
    type Encode = Bytes;
    type Decode = Bytes;
    type Encoder = BytesEncoder;
    type Decoder = BytesDecoder;

    fn encoder(&mut self) -> Self::Encoder {
        BytesEncoder
    }

    fn decoder(&mut self) -> Self::Decoder {
        BytesDecoder
    }
}

#[derive(Clone, Default)]
struct BytesEncoder;

impl Encoder for BytesEncoder {
    type Item = Bytes;
    type Error = tonic::Status;

    fn encode(&mut self, item: Self::Item, dst: &mut EncodeBuf<'_>) -> Result<(), Self::Error> {
        dst.put(item);
        Ok(())
    }
}

#[derive(Clone, Default)]
struct BytesDecoder;

impl Decoder for BytesDecoder {
    type Item = Bytes;
    type Error = tonic::Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Option<Self::Item>, Self::Error> {
        if !src.has_remaining() {
            return Ok(None);
        }
        let len = src.remaining();
        Ok(Some(src.copy_to_bytes(len)))
    }
}
