use std::fmt;

use oauth2::{basic::BasicClient, AuthUrl, Client, ClientId, ClientSecret, RedirectUrl, TokenUrl};
use serde::{Deserialize, Serialize};

use crate::{settings::{OAuthSettings, ProviderSettings}, AppError, AppResult};

type HappyClient = Client<oauth2::StandardErrorResponse<oauth2::basic::BasicErrorResponseType>, oauth2::StandardTokenResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardTokenIntrospectionResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardRevocableToken, oauth2::StandardErrorResponse<oauth2::RevocationErrorResponseType>, oauth2::EndpointSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointSet>;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClientProvider {
    Google,
    Github,
}

impl ClientProvider {
    fn slug(&self) -> &'static str {
        use ClientProvider::*;
        match self {
            Google => "google",
            Github => "github",
        }
    }

    fn endpoints(&self) -> (&'static str, &'static str) {
        use ClientProvider::*;
        match self {
            Google => ("https://accounts.google.com/o/oauth2/auth", "https://oauth2.googleapis.com/token"),
            Github => ("https://github.com/login/oauth/authorize", "https://github.com/login/oauth/access_token"),
        }
    }

    pub(crate) fn scopes(&self) -> &'static [&'static str] {
        use ClientProvider::*;
        match self {
            Google => &["openid", "email", "profile"],
            Github => &["read:user", "user:email"],
        }
    }

    pub(crate) fn userinfo_url(&self) -> &'static str {
        use ClientProvider::*;
        match self {
            Google => "https://www.googleapis.com/oauth2/v2/userinfo",
            Github => "https://api.github.com/user",
        }
    }
}

impl fmt::Display for ClientProvider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone, Default)]
pub struct Clients {
    google_client: Option<HappyClient>,
    github_client: Option<HappyClient>,
}

impl Clients {
    /// Builds a client for every provider that has keys configured.
    /// Callbacks land on `{public_url}/lockin/{provider}`.
    pub fn from_settings(oauth: &OAuthSettings, public_url: &str) -> AppResult<Clients> {
        let build = |provider: ClientProvider, keys: &Option<ProviderSettings>| -> AppResult<Option<HappyClient>> {
            let Some(ProviderSettings { client_id, client_secret }) = keys else {
                return Ok(None);
            };
            let (auth_url, token_url) = provider.endpoints();
            let redirect_url = format!("{}/lockin/{}", public_url.trim_end_matches('/'), provider.slug());

            Ok(Some(
                BasicClient::new(ClientId::new(client_id.clone()))
                    .set_client_secret(ClientSecret::new(client_secret.clone()))
                    .set_auth_uri(AuthUrl::new(auth_url.to_owned())?)
                    .set_token_uri(TokenUrl::new(token_url.to_owned())?)
                    .set_redirect_uri(RedirectUrl::new(redirect_url)?)
            ))
        };

        Ok(
            Clients {
                google_client: build(ClientProvider::Google, &oauth.google)?,
                github_client: build(ClientProvider::Github, &oauth.github)?,
            }
        )
    }

    pub fn providers(&self) -> Vec<ClientProvider> {
        [
            (ClientProvider::Google, self.google_client.is_some()),
            (ClientProvider::Github, self.github_client.is_some()),
        ]
            .into_iter()
            .filter_map(|(provider, configured)| configured.then_some(provider))
            .collect()
    }

    pub fn get_client(&self, provider: ClientProvider) -> AppResult<HappyClient> {
        use ClientProvider::*;
        match provider {
            Google => self.google_client.clone(),
            Github => self.github_client.clone(),
        }.ok_or_else(|| AppError::not_found(format!("OAuth provider {provider} keys not supplied")))
    }
}
