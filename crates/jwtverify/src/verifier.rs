use crate::algorithm::{AlgorithmPolicy, AlgorithmType};
use crate::claims::{Claims, ClaimsValidation, validate_claims};
use crate::error::{Error, ErrorKind, Result};
use crate::header::TokenHeader;
use crate::key::PublicKey;
use crate::resolver::KeyResolver;
use crate::token::ParsedToken;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Token verifier
///
/// Configured once and reused for any number of tokens. Cloning is cheap and
/// clones share the same resolver.
///
/// ```ignore
/// let verifier = TokenVerifier::new(store)
///     .algorithms(AlgorithmPolicy::rs256_only())
///     .resolve_timeout(Duration::from_millis(500))
///     .build();
///
/// let verified = verifier.verify(token).await?;
/// ```
#[derive(Clone)]
pub struct TokenVerifier {
    config_resolver: Arc<dyn KeyResolver>,
    config_algorithms: AlgorithmPolicy,
    config_timeout: Option<Duration>,
    config_claims: Option<ClaimsValidation>,
}

impl TokenVerifier {
    /// Create a verifier resolving keys through `resolver`
    ///
    /// Defaults: RSA algorithms only, no resolver timeout, no claims validation.
    pub fn new<R: KeyResolver + 'static>(resolver: R) -> Self {
        Self {
            config_resolver: Arc::new(resolver),
            config_algorithms: AlgorithmPolicy::default(),
            config_timeout: None,
            config_claims: None,
        }
    }

    /// Configure the algorithm policy
    pub fn algorithms(&mut self, policy: AlgorithmPolicy) -> &mut Self {
        self.config_algorithms = policy;
        self
    }

    /// Bound the time spent waiting for the resolver
    pub fn resolve_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.config_timeout = Some(timeout);
        self
    }

    /// Check `exp`, `nbf`, `iat` and friends after the signature is accepted
    pub fn validate(&mut self, config: ClaimsValidation) -> &mut Self {
        self.config_claims = Some(config);
        self
    }

    pub fn build(&mut self) -> Self {
        self.clone()
    }

    pub fn policy(&self) -> &AlgorithmPolicy {
        &self.config_algorithms
    }
}

impl TokenVerifier {
    /// Split and decode a token without verifying it
    ///
    /// Nothing returned from here is authenticated.
    pub fn parse<'a>(&self, token: &'a str) -> Result<ParsedToken<'a>> {
        ParsedToken::parse(token)
    }

    /// Verify a compact token
    pub async fn verify(&self, token: &str) -> Result<VerifiedToken> {
        self.verify_token(token, None).await
    }

    /// Verify a compact token, giving up with a resolver failure once `cancel` fires
    pub async fn verify_with_cancel(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<VerifiedToken> {
        self.verify_token(token, Some(cancel)).await
    }

    #[tracing::instrument(skip_all, fields(kid = tracing::field::Empty))]
    async fn verify_token(
        &self,
        token: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<VerifiedToken> {
        let result = self.run(token, cancel).await;
        match &result {
            Ok(verified) => {
                tracing::debug!(alg = %verified.algorithm, "token accepted");
            }
            Err(e) if e.kind() == ErrorKind::ResolverFailure => {
                tracing::warn!(error = %e, "key resolution failed");
            }
            Err(e) => {
                tracing::debug!(kind = ?e.kind(), "token rejected");
            }
        }
        result
    }

    async fn run(&self, token: &str, cancel: Option<&CancellationToken>) -> Result<VerifiedToken> {
        // 1. Structure: segments, header and payload
        let parsed = ParsedToken::parse(token)?;

        // 2. Key identifier
        let kid = parsed.header().key_id()?.to_string();
        tracing::Span::current().record("kid", kid.as_str());

        // 3. Key lookup
        let key = self.resolve_key(&kid, cancel).await?;

        // 4. Algorithm: allow-list, policy, key type
        let algorithm = parsed.header().algorithm()?;
        self.config_algorithms.validate(&algorithm)?;
        algorithm.check_key(&key)?;

        // 5. Signature over the original `header.payload` bytes
        let signature = parsed.signature()?;
        algorithm.verify(&key, parsed.signing_input().as_bytes(), &signature)?;

        let (header, claims) = parsed.into_parts();

        // 6. Optional claims checks
        if let Some(config) = &self.config_claims {
            validate_claims(&claims, config)?;
        }

        Ok(VerifiedToken {
            header,
            claims,
            algorithm,
            kid,
        })
    }

    async fn resolve_key(
        &self,
        kid: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Arc<PublicKey>> {
        let lookup = self.lookup(kid);
        let resolved = match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(Error::ResolverCancelled),
                    result = lookup => result,
                }
            }
            None => lookup.await,
        }?;

        resolved.ok_or_else(|| Error::KeyNotFound(kid.to_string()))
    }

    async fn lookup(&self, kid: &str) -> Result<Option<Arc<PublicKey>>> {
        let call = self.config_resolver.resolve(kid);
        let result = match self.config_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| Error::ResolverTimeout {
                    timeout_ms: limit.as_millis(),
                })?,
            None => call.await,
        };

        // Whatever the backend reports, a failed lookup is a resolver failure
        result.map_err(|e| match e.kind() {
            ErrorKind::ResolverFailure => e,
            _ => Error::ResolverFailure(e.to_string()),
        })
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.config_algorithms)
            .field("resolve_timeout", &self.config_timeout)
            .field("claims", &self.config_claims)
            .finish_non_exhaustive()
    }
}

/// A token whose signature has been verified
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    header: TokenHeader,
    claims: Claims,
    algorithm: AlgorithmType,
    kid: String,
}

impl VerifiedToken {
    pub fn header(&self) -> &TokenHeader {
        &self.header
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn algorithm(&self) -> AlgorithmType {
        self.algorithm
    }

    pub fn key_id(&self) -> &str {
        &self.kid
    }

    pub fn into_claims(self) -> Claims {
        self.claims
    }
}
