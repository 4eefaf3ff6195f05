// src/common/password.rs

use bcrypt::{hash, verify};

use crate::common::error::AppError;

/// Gera o hash em um thread separado (bcrypt é CPU-bound).
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

/// Verifica a senha; a comparação do bcrypt é em tempo constante.
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

/// Hash de uma senha que nunca é emitida. Verificar contra ele quando o
/// e-mail não existe faz o login custar o mesmo tempo nos dois casos.
pub fn dummy_hash(cost: u32) -> Result<String, AppError> {
    let seed = uuid::Uuid::new_v4().to_string();
    Ok(hash(seed, cost)?)
}
