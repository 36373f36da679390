use ring::digest::{Context, Digest, SHA256};
use tracing::instrument;

#[derive(Clone, Debug)]
pub struct Digests {
    pub sha256: Digest,
    pub size: u64,
}

impl Digests {
    #[instrument(skip_all, fields(len=data.as_ref().len()))]
    pub fn digest(data: impl AsRef<[u8]>) -> Self {
        let mut context = Context::new(&SHA256);
        context.update(data.as_ref());

        Digests {
            sha256: context.finish(),
            size: data.as_ref().len() as u64,
        }
    }
}
