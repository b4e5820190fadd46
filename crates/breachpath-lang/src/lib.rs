//! Web-application assets for the breachpath engine.
//!
//! Each asset constructor registers its steps, internal edges and defenses on
//! a shared [`GraphBuilder`] and returns a handle of [`StepId`]s. The
//! `add_*` methods wire assets together.
//!
//! ```
//! use breachpath_core::Attacker;
//! use breachpath_lang::{EndpointKind, ServerDefenses, WebModelBuilder};
//!
//! let mut web = WebModelBuilder::new();
//! let server = web.web_server("server1", ServerDefenses::default())?;
//! let app = web.web_application("shop")?;
//! let search = web.endpoint("/search.jsp", EndpointKind::Linked)?;
//! web.add_webapplication(&server, &app)?;
//! web.add_endpoint(&app, &search)?;
//! let mut model = web.build()?;
//!
//! let mut attacker = Attacker::new();
//! attacker.add_attack_point(app.crawl);
//! attacker.attack(&mut model)?;
//! model.assert_compromised_instantaneously(search.discover)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod application;
mod endpoint;
mod identity;
mod server;

pub use application::{AdminArea, WebApplication};
pub use endpoint::{Endpoint, EndpointKind, InputField};
pub use identity::{Account, Administrator, Identity, Password, User};
pub use server::{ServerDefenses, WebServer};

use breachpath_core::{EffortClass, GraphBuilder, Model, ModelResult, StepId};
use tracing::debug;

#[derive(Debug, Default)]
pub struct WebModelBuilder {
    graph: GraphBuilder,
    associations: usize,
}

impl WebModelBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn web_server(&mut self, name: &str, defenses: ServerDefenses) -> ModelResult<WebServer> {
        WebServer::add(&mut self.graph, name, defenses)
    }

    pub fn web_application(&mut self, name: &str) -> ModelResult<WebApplication> {
        WebApplication::add(&mut self.graph, name)
    }

    pub fn admin_area(&mut self, name: &str) -> ModelResult<AdminArea> {
        AdminArea::add(&mut self.graph, name)
    }

    pub fn endpoint(&mut self, path: &str, kind: EndpointKind) -> ModelResult<Endpoint> {
        Endpoint::add(&mut self.graph, path, kind)
    }

    pub fn input_field(&mut self, name: &str) -> ModelResult<InputField> {
        InputField::add(&mut self.graph, name)
    }

    pub fn administrator(&mut self, name: &str) -> ModelResult<Administrator> {
        Administrator::add(&mut self.graph, name)
    }

    pub fn user(&mut self, name: &str) -> ModelResult<User> {
        User::add(&mut self.graph, name)
    }

    pub fn account(&mut self, name: &str) -> ModelResult<Account> {
        Account::add(&mut self.graph, name)
    }

    pub fn password(&mut self, name: &str) -> ModelResult<Password> {
        Password::add(&mut self.graph, name)
    }

    /// Root on the server gives full control of the hosted application.
    pub fn add_webapplication(&mut self, server: &WebServer, app: &WebApplication) -> ModelResult<()> {
        self.link(server.privileged_code_execution, app.full_access, EffortClass::Instantaneous)
    }

    /// Crawling finds linked endpoints at once; brute force finds any
    /// endpoint with effort.
    pub fn add_endpoint(&mut self, app: &WebApplication, endpoint: &Endpoint) -> ModelResult<()> {
        if endpoint.kind == EndpointKind::Linked {
            self.link(app.crawl, endpoint.discover, EffortClass::Instantaneous)?;
        }
        self.link(app.directory_brute_force, endpoint.discover, EffortClass::WithEffort)
    }

    pub fn add_adminarea(&mut self, app: &WebApplication, area: &AdminArea) -> ModelResult<()> {
        self.link(app.directory_brute_force, area.discover, EffortClass::WithEffort)?;
        self.link(area.access, app.full_access, EffortClass::Instantaneous)
    }

    /// Full control of the application includes every account on it.
    pub fn add_account(&mut self, app: &WebApplication, account: &Account) -> ModelResult<()> {
        self.link(app.full_access, account.authenticate, EffortClass::Instantaneous)
    }

    pub fn add_inputfield(&mut self, endpoint: &Endpoint, field: &InputField) -> ModelResult<()> {
        self.link(endpoint.access, field.discover, EffortClass::Instantaneous)
    }

    /// An authenticated administrator hands over the area's credentials.
    pub fn add_administrator(&mut self, area: &AdminArea, admin: &Administrator) -> ModelResult<()> {
        self.link(admin.authenticate, area.obtain_credentials, EffortClass::Instantaneous)
    }

    pub fn add_token(&mut self, identity: &impl Identity, password: &Password) -> ModelResult<()> {
        self.link(password.obtain, identity.authenticate(), EffortClass::Instantaneous)
    }

    /// The owning account opens its private endpoint directly.
    pub fn add_private_url(&mut self, account: &Account, endpoint: &Endpoint) -> ModelResult<()> {
        self.link(account.authenticate, endpoint.access, EffortClass::Instantaneous)
    }

    /// Direct access to the underlying builder for steps the language lacks.
    pub fn graph_mut(&mut self) -> &mut GraphBuilder {
        &mut self.graph
    }

    pub fn build(self) -> ModelResult<Model> {
        debug!(
            steps = self.graph.step_count(),
            associations = self.associations,
            "building web model"
        );
        Ok(Model::new(self.graph.build()?))
    }

    fn link(&mut self, parent: StepId, child: StepId, cost: EffortClass) -> ModelResult<()> {
        self.graph.add_edge(parent, child, cost, true)?;
        self.associations += 1;
        Ok(())
    }
}
