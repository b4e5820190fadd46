use breachpath_core::{AssetId, EffortClass, Gate, GraphBuilder, Guard, ModelResult, StepId};

/// Hardening switches of a [`WebServer`]. All off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerDefenses {
    pub fully_patched: bool,
    pub encryption_enabled: bool,
    pub x_frame_options_enabled: bool,
    pub secure_flag_enabled: bool,
}

impl ServerDefenses {
    /// Every defense switched on.
    #[must_use]
    pub fn hardened() -> Self {
        Self {
            fully_patched: true,
            encryption_enabled: true,
            x_frame_options_enabled: true,
            secure_flag_enabled: true,
        }
    }
}

/// Host serving one or more web applications.
///
/// Privileged code execution needs both an RCE and a privilege escalation
/// exploit; patching disables both exploits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebServer {
    pub asset: AssetId,
    pub attempt_rce_exploit: StepId,
    pub exploit_rce: StepId,
    pub attempt_privesc_exploit: StepId,
    pub exploit_privesc: StepId,
    pub privileged_code_execution: StepId,
    pub attempt_sniff: StepId,
    pub sniff: StepId,
    pub steal_session_cookies: StepId,
    pub attempt_clickjacking: StepId,
    pub clickjacking: StepId,
}

impl WebServer {
    pub(crate) fn add(g: &mut GraphBuilder, name: &str, defenses: ServerDefenses) -> ModelResult<Self> {
        let asset = g.add_asset(name, "WebServer")?;
        let patched = g.add_defense(asset, "fullyPatched", defenses.fully_patched)?;
        let encryption = g.add_defense(asset, "encryptionEnabled", defenses.encryption_enabled)?;
        let xfo = g.add_defense(
            asset,
            "xFrameOptionsEnabled",
            defenses.x_frame_options_enabled,
        )?;
        let secure = g.add_defense(asset, "secureFlagEnabled", defenses.secure_flag_enabled)?;

        let mut or = |step: &str| g.add_attack_step(asset, step, Gate::Or);
        let attempt_rce_exploit = or("attemptRCEExploit")?;
        let exploit_rce = or("exploitRCE")?;
        let attempt_privesc_exploit = or("attemptPrivescExploit")?;
        let exploit_privesc = or("exploitPrivesc")?;
        let attempt_sniff = or("attemptSniff")?;
        let sniff = or("sniff")?;
        let steal_session_cookies = or("stealSessionCookies")?;
        let attempt_clickjacking = or("attemptClickjacking")?;
        let clickjacking = or("clickjacking")?;
        let privileged_code_execution =
            g.add_attack_step(asset, "privilegedCodeExecution", Gate::And)?;

        let inst = EffortClass::Instantaneous;
        g.add_edge(attempt_rce_exploit, exploit_rce, inst, true)?;
        g.add_edge(attempt_privesc_exploit, exploit_privesc, inst, true)?;
        g.add_edge(exploit_rce, privileged_code_execution, inst, true)?;
        g.add_edge(exploit_privesc, privileged_code_execution, inst, true)?;
        g.add_edge(attempt_sniff, sniff, inst, true)?;
        g.add_edge(sniff, steal_session_cookies, inst, true)?;
        g.add_edge(attempt_clickjacking, clickjacking, inst, true)?;

        g.disable_step_when(exploit_rce, Guard::enabled(patched))?;
        g.disable_step_when(exploit_privesc, Guard::enabled(patched))?;
        g.disable_step_when(sniff, Guard::enabled(encryption))?;
        g.disable_step_when(steal_session_cookies, Guard::enabled(secure))?;
        g.disable_step_when(clickjacking, Guard::enabled(xfo))?;

        Ok(Self {
            asset,
            attempt_rce_exploit,
            exploit_rce,
            attempt_privesc_exploit,
            exploit_privesc,
            privileged_code_execution,
            attempt_sniff,
            sniff,
            steal_session_cookies,
            attempt_clickjacking,
            clickjacking,
        })
    }
}
