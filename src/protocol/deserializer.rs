use async_trait::async_trait;
use tokio::io::AsyncReadExt;

use super::contestant::{Contestant, WrongFieldCount};

#[async_trait]
pub trait Deserialize: Sized {
    type Error;

    // Deserialize a structure from a reader
    async fn deserialize<R: AsyncReadExt + Unpin + Send>(
        reader: &mut R,
    ) -> Result<Self, Self::Error>;
}

#[derive(thiserror::Error, Debug)]
pub enum DeserializeError {
    #[error("{0}")]
    Utf(#[from] std::string::FromUtf8Error),

    #[error("{0}")]
    Io(#[from] tokio::io::Error),

    #[error("{0}")]
    Record(#[from] WrongFieldCount),
}

#[async_trait]
impl Deserialize for Contestant {
    type Error = DeserializeError;

    async fn deserialize<R: AsyncReadExt + Unpin + Send>(
        reader: &mut R,
    ) -> Result<Self, Self::Error> {
        // Length-prefixed raw record
        let length = reader.read_u16().await?;
        let mut raw = vec![0u8; length as usize];
        reader.read_exact(&mut raw).await?;

        let record = String::from_utf8(raw)?;

        Ok(Contestant::from_record(&record)?)
    }
}
