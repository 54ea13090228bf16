//! Wire types and unary client for the `api.Dex` gRPC service.
//!
//! Field tags follow `api/v2/api.proto` from the Dex repository. Only the
//! client and connector RPCs are declared.

use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Channel;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Client {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub secret: String,
    #[prost(string, repeated, tag = "3")]
    pub redirect_uris: Vec<String>,
    #[prost(string, repeated, tag = "4")]
    pub trusted_peers: Vec<String>,
    #[prost(bool, tag = "5")]
    pub public: bool,
    #[prost(string, tag = "6")]
    pub name: String,
    #[prost(string, tag = "7")]
    pub logo_url: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateClientReq {
    #[prost(message, optional, tag = "1")]
    pub client: Option<Client>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateClientResp {
    #[prost(bool, tag = "1")]
    pub already_exists: bool,
    #[prost(message, optional, tag = "2")]
    pub client: Option<Client>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetClientReq {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetClientResp {
    #[prost(message, optional, tag = "1")]
    pub client: Option<Client>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct ListClientReq {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListClientResp {
    #[prost(message, repeated, tag = "1")]
    pub clients: Vec<Client>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateClientReq {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, repeated, tag = "2")]
    pub redirect_uris: Vec<String>,
    #[prost(string, repeated, tag = "3")]
    pub trusted_peers: Vec<String>,
    #[prost(string, tag = "4")]
    pub name: String,
    #[prost(string, tag = "5")]
    pub logo_url: String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct UpdateClientResp {
    #[prost(bool, tag = "1")]
    pub not_found: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteClientReq {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct DeleteClientResp {
    #[prost(bool, tag = "1")]
    pub not_found: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Connector {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub r#type: String,
    #[prost(string, tag = "3")]
    pub name: String,
    #[prost(bytes = "vec", tag = "4")]
    pub config: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateConnectorReq {
    #[prost(message, optional, tag = "1")]
    pub connector: Option<Connector>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct CreateConnectorResp {
    #[prost(bool, tag = "1")]
    pub already_exists: bool,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct ListConnectorReq {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListConnectorResp {
    #[prost(message, repeated, tag = "1")]
    pub connectors: Vec<Connector>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateConnectorReq {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub new_type: String,
    #[prost(string, tag = "3")]
    pub new_name: String,
    #[prost(bytes = "vec", tag = "4")]
    pub new_config: Vec<u8>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct UpdateConnectorResp {
    #[prost(bool, tag = "1")]
    pub not_found: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteConnectorReq {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct DeleteConnectorResp {
    #[prost(bool, tag = "1")]
    pub not_found: bool,
}

pub const CREATE_CLIENT: &str = "/api.Dex/CreateClient";
pub const GET_CLIENT: &str = "/api.Dex/GetClient";
pub const LIST_CLIENTS: &str = "/api.Dex/ListClients";
pub const UPDATE_CLIENT: &str = "/api.Dex/UpdateClient";
pub const DELETE_CLIENT: &str = "/api.Dex/DeleteClient";
pub const CREATE_CONNECTOR: &str = "/api.Dex/CreateConnector";
pub const LIST_CONNECTORS: &str = "/api.Dex/ListConnectors";
pub const UPDATE_CONNECTOR: &str = "/api.Dex/UpdateConnector";
pub const DELETE_CONNECTOR: &str = "/api.Dex/DeleteConnector";

/// Unary caller for `api.Dex` over a shared channel
#[derive(Debug, Clone)]
pub struct DexClient {
    inner: tonic::client::Grpc<Channel>,
}

impl DexClient {
    #[must_use]
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
        }
    }

    pub async fn unary<Req, Resp>(
        &mut self,
        method: &'static str,
        request: tonic::Request<Req>,
    ) -> Result<tonic::Response<Resp>, tonic::Status>
    where
        Req: ::prost::Message + Send + Sync + 'static,
        Resp: ::prost::Message + Default + Send + Sync + 'static,
    {
        self.inner
            .ready()
            .await
            .map_err(|e| tonic::Status::unavailable(format!("service was not ready: {e}")))?;
        let codec = tonic::codec::ProstCodec::<Req, Resp>::default();
        self.inner
            .unary(request, PathAndQuery::from_static(method), codec)
            .await
    }
}
