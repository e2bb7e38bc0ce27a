use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::contestant::Contestant;
use super::message::{results_marker, BatchResponse, ResultsResponse};

#[async_trait]
pub trait Serialize: Sized {
    type Error;

    /// Serialize a structure into a writer
    async fn serialize<W: AsyncWriteExt + Unpin + Send>(
        &self,
        writer: &mut W,
    ) -> Result<(), Self::Error>;
}

#[derive(thiserror::Error, Debug)]
pub enum SerializeError {
    #[error("The input is too long!")]
    TooLong,

    #[error("{0}")]
    Io(#[from] tokio::io::Error),
}

#[async_trait]
impl Serialize for Contestant {
    type Error = SerializeError;

    async fn serialize<W: AsyncWriteExt + Unpin + Send>(
        &self,
        writer: &mut W,
    ) -> Result<(), Self::Error> {
        let record = self.to_record();
        let length: u16 = record
            .len()
            .try_into()
            .map_err(|_| SerializeError::TooLong)?;

        writer.write_u16(length).await?;
        writer.write_all(record.as_bytes()).await?;

        Ok(())
    }
}

#[async_trait]
impl Serialize for BatchResponse {
    type Error = SerializeError;

    async fn serialize<W: AsyncWriteExt + Unpin + Send>(
        &self,
        writer: &mut W,
    ) -> Result<(), Self::Error> {
        let count: u16 = self
            .winners
            .len()
            .try_into()
            .map_err(|_| SerializeError::TooLong)?;

        writer.write_u16(count).await?;
        for winner in &self.winners {
            winner.serialize(writer).await?;
        }

        Ok(())
    }
}

#[async_trait]
impl Serialize for ResultsResponse {
    type Error = SerializeError;

    async fn serialize<W: AsyncWriteExt + Unpin + Send>(
        &self,
        writer: &mut W,
    ) -> Result<(), Self::Error> {
        match self {
            ResultsResponse::Pending {
                waiting,
                total_winners,
            } => {
                writer.write_u8(results_marker::PENDING).await?;
                writer.write_u16(*waiting).await?;
                writer.write_u32(*total_winners).await?;
            }
            ResultsResponse::Final { total_winners } => {
                writer.write_u8(results_marker::FINAL).await?;
                writer.write_u32(*total_winners).await?;
            }
        };

        Ok(())
    }
}
