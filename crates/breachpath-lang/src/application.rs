use breachpath_core::{AssetId, EffortClass, Gate, GraphBuilder, ModelResult, StepId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebApplication {
    pub asset: AssetId,
    /// Following links from known pages.
    pub crawl: StepId,
    /// Guessing unlinked paths from a wordlist.
    pub directory_brute_force: StepId,
    pub full_access: StepId,
}

impl WebApplication {
    pub(crate) fn add(g: &mut GraphBuilder, name: &str) -> ModelResult<Self> {
        let asset = g.add_asset(name, "WebApplication")?;
        Ok(Self {
            asset,
            crawl: g.add_attack_step(asset, "crawl", Gate::Or)?,
            directory_brute_force: g.add_attack_step(asset, "directoryBruteForce", Gate::Or)?,
            full_access: g.add_attack_step(asset, "fullAccess", Gate::Or)?,
        })
    }
}

/// Login-protected administration pages of a [`WebApplication`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminArea {
    pub asset: AssetId,
    pub discover: StepId,
    pub obtain_credentials: StepId,
    /// AND over `discover` and `obtain_credentials`.
    pub login: StepId,
    pub access: StepId,
}

impl AdminArea {
    pub(crate) fn add(g: &mut GraphBuilder, name: &str) -> ModelResult<Self> {
        let asset = g.add_asset(name, "AdminArea")?;
        let discover = g.add_attack_step(asset, "discover", Gate::Or)?;
        let obtain_credentials = g.add_attack_step(asset, "obtainCredentials", Gate::Or)?;
        let login = g.add_attack_step(asset, "login", Gate::And)?;
        let access = g.add_attack_step(asset, "access", Gate::Or)?;

        let inst = EffortClass::Instantaneous;
        g.add_edge(discover, login, inst, true)?;
        g.add_edge(obtain_credentials, login, inst, true)?;
        g.add_edge(login, access, inst, true)?;

        Ok(Self {
            asset,
            discover,
            obtain_credentials,
            login,
            access,
        })
    }
}
