use async_trait::async_trait;
use tokio::task;

use super::errors::UserError;

#[async_trait]
pub trait HashProvider: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String, UserError>;
    async fn verify(&self, password: &str, hashed: &str) -> Result<bool, UserError>;
}

/// bcrypt on tokio's blocking pool, keeping the request workers free while
/// a hash is computed.
pub struct BcryptHashProvider {
    cost: u32,
}

impl BcryptHashProvider {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHashProvider {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

fn hash_error(e: impl ToString) -> UserError {
    UserError::Hash(e.to_string())
}

#[async_trait]
impl HashProvider for BcryptHashProvider {
    async fn hash(&self, password: &str) -> Result<String, UserError> {
        let password = password.to_string();
        let cost = self.cost;

        task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(hash_error)?
            .map_err(hash_error)
    }

    async fn verify(&self, password: &str, hashed: &str) -> Result<bool, UserError> {
        let password = password.to_string();
        let hashed = hashed.to_string();

        task::spawn_blocking(move || bcrypt::verify(password, &hashed))
            .await
            .map_err(hash_error)?
            .map_err(hash_error)
    }
}

/// Reversible stand-in so tests avoid bcrypt's cost.
#[cfg(test)]
#[derive(Default)]
pub struct FakeHashProvider;

#[cfg(test)]
#[async_trait]
impl HashProvider for FakeHashProvider {
    async fn hash(&self, password: &str) -> Result<String, UserError> {
        Ok(format!("hashed:{}", password))
    }

    async fn verify(&self, password: &str, hashed: &str) -> Result<bool, UserError> {
        Ok(hashed == format!("hashed:{}", password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bcrypt_round_trip() {
        // lowest cost bcrypt accepts
        let provider = BcryptHashProvider::new(4);
        let hashed = provider.hash("secret").await.unwrap();

        assert_ne!(hashed, "secret");
        assert!(provider.verify("secret", &hashed).await.unwrap());
        assert!(!provider.verify("wrong", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn test_bcrypt_invalid_cost() {
        let provider = BcryptHashProvider::new(99);
        assert!(matches!(provider.hash("secret").await, Err(UserError::Hash(_))));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_bcrypt_does_not_block_the_runtime() {
        let provider = BcryptHashProvider::new(10);

        // a single-threaded runtime can only make progress on the ticker
        // while the hash runs elsewhere
        let ticker = tokio::spawn(async {
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            true
        });
        let hashed = provider.hash("secret").await.unwrap();

        assert!(ticker.is_finished());
        assert!(ticker.await.unwrap());
        assert!(hashed.starts_with("$2"));
    }
}
