use std::{collections::HashMap, pin::Pin, result::Result};

pub use datasource::data_source_service_server::{DataSourceService, DataSourceServiceServer};
use datasource::{
    data_response::Kind, field::Values, CheckHealthRequest, CheckHealthResponse, DataResponse,
    HealthStatus, PublishStreamRequest, PublishStreamResponse, PublishStreamStatus,
    QueryDataRequest, QueryDataResponse, RunStreamRequest, RunStreamResponse,
    SubscribeStreamRequest, SubscribeStreamResponse, SubscribeStreamStatus,
};
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, Stream, StreamExt};
use tonic::{Request, Response, Status};
use tracing::{error, info};

use crate::{
    client::GraphClient,
    frame::{self, FieldValues},
    health, query, stream,
};

pub mod datasource {
    tonic::include_proto!("datasource.v1");
}

/// The data-source backend service exposed to the dashboard host.
///
/// Holds the one database client handle shared by every operation; dropping
/// the service releases it.
#[derive(Debug)]
pub struct DataSource<C> {
    client: C,
}

impl<C> DataSource<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

fn to_wire_frame(frame: frame::Frame) -> datasource::Frame {
    datasource::Frame {
        name: frame.name,
        fields: frame
            .fields
            .into_iter()
            .map(|field| datasource::Field {
                name: field.name,
                values: Some(match field.values {
                    FieldValues::Time(times) => Values::Times(datasource::TimeColumn {
                        unix_ms: times.iter().map(|t| t.timestamp_millis()).collect(),
                    }),
                    FieldValues::Number(values) => {
                        Values::Numbers(datasource::NumberColumn { values })
                    }
                    FieldValues::Text(values) => Values::Texts(datasource::TextColumn { values }),
                    FieldValues::Int(values) => Values::Ints(datasource::IntColumn { values }),
                }),
            })
            .collect(),
    }
}

fn frame_response(frame: frame::Frame) -> Result<RunStreamResponse, Status> {
    Ok(RunStreamResponse {
        frame: Some(to_wire_frame(frame)),
    })
}

#[tonic::async_trait]
impl<C: GraphClient + 'static> DataSourceService for DataSource<C> {
    type RunStreamStream =
        Pin<Box<dyn Stream<Item = Result<RunStreamResponse, Status>> + Send + Sync>>;

    async fn query_data(
        &self,
        request: Request<QueryDataRequest>,
    ) -> Result<Response<QueryDataResponse>, Status> {
        let (_, _, data) = request.into_parts();
        info!(queries = data.queries.len(), "query batch received");

        // Each query gets its own entry; one failing query never takes the
        // rest of the batch down with it.
        let mut responses = HashMap::with_capacity(data.queries.len());
        for data_query in data.queries {
            let kind = match query::run_query(&self.client, &data_query.json).await {
                Ok(Some(frame)) => Some(Kind::Frame(to_wire_frame(frame))),
                Ok(None) => None,
                Err(e) => {
                    error!(ref_id = %data_query.ref_id, error = %e, "query failed");
                    Some(Kind::Error(e.to_string()))
                }
            };
            responses.insert(data_query.ref_id, DataResponse { kind });
        }

        Ok(Response::new(QueryDataResponse { responses }))
    }

    async fn check_health(
        &self,
        _request: Request<CheckHealthRequest>,
    ) -> Result<Response<CheckHealthResponse>, Status> {
        let probe = health::probe(&self.client).await;

        let (status, message) = if probe.is_healthy() {
            (
                HealthStatus::Ok,
                format!(
                    "data source is working: `{}` == `{}`",
                    health::PROBE_QUERY,
                    probe.detail()
                ),
            )
        } else {
            (
                HealthStatus::Error,
                format!(
                    "data source is in error: `{}` == `{}`",
                    health::PROBE_QUERY,
                    probe.detail()
                ),
            )
        };

        Ok(Response::new(CheckHealthResponse {
            status: status.into(),
            message,
        }))
    }

    async fn subscribe_stream(
        &self,
        request: Request<SubscribeStreamRequest>,
    ) -> Result<Response<SubscribeStreamResponse>, Status> {
        let path = &request.get_ref().path;

        // Allow subscribing only on the expected path.
        let status = if path == stream::STREAM_PATH {
            SubscribeStreamStatus::Ok
        } else {
            SubscribeStreamStatus::PermissionDenied
        };

        Ok(Response::new(SubscribeStreamResponse {
            status: status.into(),
        }))
    }

    async fn publish_stream(
        &self,
        _request: Request<PublishStreamRequest>,
    ) -> Result<Response<PublishStreamResponse>, Status> {
        // Clients never get to publish into the stream.
        Ok(Response::new(PublishStreamResponse {
            status: PublishStreamStatus::PermissionDenied.into(),
        }))
    }

    async fn run_stream(
        &self,
        request: Request<RunStreamRequest>,
    ) -> Result<Response<Self::RunStreamStream>, Status> {
        let path = request.into_inner().path;
        if path != stream::STREAM_PATH {
            return Err(Status::permission_denied(format!(
                "no stream at path {path:?}"
            )));
        }
        info!(%path, "stream subscriber connected");

        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(stream::push_frames(tx, stream::TICK_PERIOD));

        let frames = Box::pin(ReceiverStream::new(rx).map(frame_response)) as Self::RunStreamStream;
        Ok(Response::new(frames))
    }
}
