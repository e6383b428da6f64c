#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("parse query body: {0}")]
    ParseBody(#[from] serde_json::Error),

    #[error("execute query: {0}")]
    Execute(#[from] crate::client::Error),

    #[error("decode rows: {0}")]
    Decode(#[from] crate::frame::decode::Error),
}
