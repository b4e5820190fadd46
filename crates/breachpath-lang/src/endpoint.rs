use breachpath_core::{AssetId, EffortClass, Gate, GraphBuilder, Guard, ModelResult, StepId};

/// How an endpoint can be found and who may open it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Only found by brute force.
    Plain,
    /// Linked from other pages, so crawling finds it.
    Linked,
    /// Deliberately unlinked, e.g. `/admin.jsp`.
    Hidden,
    /// Belongs to one account. Unless access control is enforced, anybody
    /// who finds it can attempt to open it (IDOR).
    Private { access_control_enforced: bool },
}

impl EndpointKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "Endpoint",
            Self::Linked => "LinkedEndpoint",
            Self::Hidden => "HiddenEndpoint",
            Self::Private { .. } => "PrivateEndpoint",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub asset: AssetId,
    pub kind: EndpointKind,
    pub discover: StepId,
    pub access: StepId,
    /// Present on private endpoints only.
    pub attempt_access: Option<StepId>,
}

impl Endpoint {
    pub(crate) fn add(g: &mut GraphBuilder, path: &str, kind: EndpointKind) -> ModelResult<Self> {
        let asset = g.add_asset(path, kind.as_str())?;
        let discover = g.add_attack_step(asset, "discover", Gate::Or)?;
        let access = g.add_attack_step(asset, "access", Gate::Or)?;

        let attempt_access = match kind {
            EndpointKind::Private {
                access_control_enforced,
            } => {
                let acl = g.add_defense(asset, "accessControlEnforced", access_control_enforced)?;
                let attempt = g.add_attack_step(asset, "attemptAccess", Gate::And)?;
                let edge = g.add_edge(discover, attempt, EffortClass::Instantaneous, true)?;
                g.block_edge_when(edge, Guard::enabled(acl))?;
                g.add_edge(attempt, access, EffortClass::Instantaneous, true)?;
                Some(attempt)
            }
            _ => {
                g.add_edge(discover, access, EffortClass::Instantaneous, true)?;
                None
            }
        };

        Ok(Self {
            asset,
            kind,
            discover,
            access,
            attempt_access,
        })
    }
}

/// A form or query parameter reachable through an [`Endpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputField {
    pub asset: AssetId,
    pub discover: StepId,
    pub fuzz: StepId,
    pub sql_injection: StepId,
    pub xss: StepId,
}

impl InputField {
    pub(crate) fn add(g: &mut GraphBuilder, name: &str) -> ModelResult<Self> {
        let asset = g.add_asset(name, "InputField")?;
        let discover = g.add_attack_step(asset, "discover", Gate::Or)?;
        let fuzz = g.add_attack_step(asset, "fuzz", Gate::Or)?;
        let sql_injection = g.add_attack_step(asset, "sqlInjection", Gate::Or)?;
        let xss = g.add_attack_step(asset, "xss", Gate::Or)?;

        let effort = EffortClass::WithEffort;
        g.add_edge(discover, fuzz, effort, true)?;
        g.add_edge(fuzz, sql_injection, effort, true)?;
        g.add_edge(fuzz, xss, effort, true)?;

        Ok(Self {
            asset,
            discover,
            fuzz,
            sql_injection,
            xss,
        })
    }
}
