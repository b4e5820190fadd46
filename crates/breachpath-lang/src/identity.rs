use breachpath_core::{AssetId, EffortClass, Gate, GraphBuilder, ModelResult, StepId};

/// Anything that logs in with a token.
pub trait Identity {
    fn asset(&self) -> AssetId;
    fn authenticate(&self) -> StepId;
}

macro_rules! identity {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            pub asset: AssetId,
            pub authenticate: StepId,
        }

        impl $name {
            pub(crate) fn add(g: &mut GraphBuilder, name: &str) -> ModelResult<Self> {
                let asset = g.add_asset(name, $kind)?;
                let authenticate = g.add_attack_step(asset, "authenticate", Gate::Or)?;
                Ok(Self {
                    asset,
                    authenticate,
                })
            }
        }

        impl Identity for $name {
            fn asset(&self) -> AssetId {
                self.asset
            }

            fn authenticate(&self) -> StepId {
                self.authenticate
            }
        }
    };
}

identity!(
    /// Holds the credentials of an [`AdminArea`](crate::AdminArea).
    Administrator,
    "Administrator"
);
identity!(User, "User");
identity!(
    /// Application account owning private endpoints.
    Account,
    "Account"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Password {
    pub asset: AssetId,
    pub obtain: StepId,
    pub guess: StepId,
}

impl Password {
    pub(crate) fn add(g: &mut GraphBuilder, name: &str) -> ModelResult<Self> {
        let asset = g.add_asset(name, "Password")?;
        let obtain = g.add_attack_step(asset, "obtain", Gate::Or)?;
        let guess = g.add_attack_step(asset, "guess", Gate::Or)?;
        g.add_edge(guess, obtain, EffortClass::WithEffort, true)?;
        Ok(Self {
            asset,
            obtain,
            guess,
        })
    }
}
