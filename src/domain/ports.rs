use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn source(&self) -> &str;
    fn output_path(&self) -> &str;
}

/// A formatting pass over some document or payload: discover the inputs,
/// format them, write the result. Stages run to completion sequentially;
/// the transform stage is pure.
#[async_trait]
pub trait Pipeline: Send + Sync {
    type Item: Send;
    type Output: Send;

    async fn extract(&self) -> Result<Vec<Self::Item>>;
    async fn transform(&self, items: Vec<Self::Item>) -> Result<Self::Output>;
    async fn load(&self, output: Self::Output) -> Result<String>;
}
