// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    autorizacao::ROLE_FUNCIONARIO,
    common::error::AppError,
    db::UsuarioRepository,
    models::auth::{Claims, UsuarioComRoles},
};

// Tokens valem por 1 hora
const VALIDADE_TOKEN_SEGUNDOS: i64 = 60 * 60;

/// Gera o bearer token com identidade + papéis do usuário.
pub fn gerar_token(usuario: &UsuarioComRoles, jwt_secret: &str) -> Result<String, AppError> {
    let agora = Utc::now();
    let expira_em = agora + chrono::Duration::seconds(VALIDADE_TOKEN_SEGUNDOS);

    let claims = Claims {
        sub: usuario.id,
        usuario: usuario.usuario.clone(),
        nome: usuario.nome.clone(),
        setor_id: usuario.setor_id,
        roles: usuario.roles.clone(),
        exp: expira_em.timestamp() as usize,
        iat: agora.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )?)
}

/// Decodifica e valida o token; distingue expiração de token malformado.
pub fn decodificar_token(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let dados = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpirado,
        _ => AppError::TokenInvalido,
    })?;

    Ok(dados.claims)
}

#[derive(Clone)]
pub struct AuthService {
    usuario_repo: UsuarioRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(usuario_repo: UsuarioRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self { usuario_repo, jwt_secret, pool }
    }

    /// Registra um novo usuário e atribui o papel padrão 'funcionario',
    /// tudo dentro de uma transação.
    pub async fn registrar(
        &self,
        usuario: &str,
        password: &str,
        nome: &str,
        setor_id: i32,
    ) -> Result<UsuarioComRoles, AppError> {
        if self.usuario_repo.buscar_por_login(usuario).await?.is_some() {
            return Err(AppError::UsuarioJaExiste);
        }

        // O hashing é pesado; sai do runtime assíncrono.
        let password_clone = password.to_owned();
        let senha_hash =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let mut tx = self.pool.begin().await?;

        let novo = self
            .usuario_repo
            .criar_usuario(&mut *tx, usuario, &senha_hash, nome, setor_id)
            .await?;

        self.usuario_repo
            .atribuir_role(&mut *tx, novo.id, ROLE_FUNCIONARIO)
            .await?;

        tx.commit().await?;

        let roles = self.usuario_repo.roles_do_usuario(novo.id).await?;
        tracing::info!("Usuário '{}' registrado com papel padrão '{}'.", novo.usuario, ROLE_FUNCIONARIO);

        Ok(UsuarioComRoles {
            id: novo.id,
            usuario: novo.usuario,
            nome: novo.nome,
            setor_id: novo.setor_id,
            roles,
        })
    }

    /// Verifica as credenciais e emite o token de 1 hora.
    pub async fn login(&self, usuario: &str, password: &str) -> Result<String, AppError> {
        let registro = self
            .usuario_repo
            .buscar_por_login(usuario)
            .await?
            .ok_or(AppError::CredenciaisInvalidas)?;

        let password_clone = password.to_owned();
        let senha_hash = registro.senha.clone();
        let senha_confere =
            tokio::task::spawn_blocking(move || verify(&password_clone, &senha_hash))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !senha_confere {
            return Err(AppError::CredenciaisInvalidas);
        }

        let roles = self.usuario_repo.roles_do_usuario(registro.id).await?;

        gerar_token(
            &UsuarioComRoles {
                id: registro.id,
                usuario: registro.usuario,
                nome: registro.nome,
                setor_id: registro.setor_id,
                roles,
            },
            &self.jwt_secret,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usuario_teste() -> UsuarioComRoles {
        UsuarioComRoles {
            id: 7,
            usuario: "maria.souza".into(),
            nome: "Maria Souza".into(),
            setor_id: Some(3),
            roles: vec!["funcionario".into()],
        }
    }

    #[test]
    fn token_carrega_identidade_e_roles() {
        let token = gerar_token(&usuario_teste(), "segredo-de-teste").unwrap();
        let claims = decodificar_token(&token, "segredo-de-teste").unwrap();

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.usuario, "maria.souza");
        assert_eq!(claims.nome, "Maria Souza");
        assert_eq!(claims.setor_id, Some(3));
        assert_eq!(claims.roles, vec!["funcionario".to_string()]);
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, VALIDADE_TOKEN_SEGUNDOS as usize);
    }

    #[test]
    fn token_com_segredo_errado_e_rejeitado() {
        let token = gerar_token(&usuario_teste(), "segredo-a").unwrap();
        let err = decodificar_token(&token, "segredo-b").unwrap_err();
        assert!(matches!(err, AppError::TokenInvalido));
    }

    #[test]
    fn token_adulterado_e_rejeitado() {
        let token = gerar_token(&usuario_teste(), "segredo").unwrap();
        let adulterado = format!("{}x", token);
        assert!(decodificar_token(&adulterado, "segredo").is_err());
    }
}
