use scout_common::StealthLevel;

use super::fingerprint::IdentityProfile;

/// Construct Chrome command-line arguments for a stealth level, identity and
/// optional proxy.
pub fn build_stealth_arguments(
    level: StealthLevel,
    identity: &IdentityProfile,
    headless: bool,
    proxy: Option<&str>,
) -> Vec<String> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-notifications".to_string(),
        "--disable-popup-blocking".to_string(),
        "--disable-extensions".to_string(),
        format!("--user-agent={}", identity.user_agent),
        format!(
            "--window-size={},{}",
            identity.viewport.0, identity.viewport.1
        ),
    ];
    if headless {
        args.push("--headless=new".to_string());
    }
    if let Some(proxy) = proxy {
        args.push(format!("--proxy-server={proxy}"));
    }
    if level.at_least(StealthLevel::Balanced) {
        args.push("--disable-infobars".to_string());
        args.push(format!("--lang={}", identity.languages.join(",")));
    }
    if level.at_least(StealthLevel::Maximum) {
        args.push("--disable-plugins-discovery".to_string());
        args.push("--disable-gpu".to_string());
    }
    args
}

/// JavaScript evasions applied after navigation to reduce automation signals.
pub struct StealthScripts;

impl StealthScripts {
    /// Always applied: hide the WebDriver flag.
    pub fn webdriver_evasion() -> &'static str {
        r#"Object.defineProperty(navigator, 'webdriver', { get: () => undefined });"#
    }

    pub fn get_core_evasions() -> &'static str {
        r#"
            Object.defineProperty(navigator, 'plugins', { get: () => [1,2,3] });
            Object.defineProperty(navigator, 'languages', {
                get: () => ['en-US', 'en']
            });
            if (!window.chrome) window.chrome = { runtime: {} };
        "#
    }

    pub fn get_webgl_evasions() -> &'static str {
        r#"
            const getParameter = WebGLRenderingContext.prototype.getParameter;
            WebGLRenderingContext.prototype.getParameter = function(parameter) {
                if (parameter === 37445) return 'Intel Inc.';
                if (parameter === 37446) return 'Intel Iris OpenGL Engine';
                return getParameter.call(this, parameter);
            };
        "#
    }

    pub fn get_canvas_evasions() -> &'static str {
        r#"
            const getContext = HTMLCanvasElement.prototype.getContext;
            HTMLCanvasElement.prototype.getContext = function(type,...args){
                const ctx = getContext.call(this,type,...args);
                if(type==='2d' && ctx) {
                    const origToDataURL=this.toDataURL;
                    this.toDataURL=function(...a){
                        const imgdata=ctx.getImageData(0,0,this.width,this.height);
                        for(let i=0;i<imgdata.data.length;i+=4){
                            if(Math.random()<0.001)imgdata.data[i]+=Math.random()<0.5?-1:1;
                        }
                        ctx.putImageData(imgdata,0,0);
                        return origToDataURL.call(this,...a);
                    };
                }
                return ctx;
            };
        "#
    }

    /// Override `navigator.platform` to agree with the user agent.
    pub fn platform_override(platform: &str) -> String {
        let quoted = serde_json::Value::String(platform.to_string()).to_string();
        format!("Object.defineProperty(navigator, 'platform', {{ get: () => {quoted} }});")
    }

    /// Scripts for `level`, in the order they should run.
    pub fn for_level(level: StealthLevel, identity: &IdentityProfile) -> Vec<String> {
        let mut scripts = vec![Self::webdriver_evasion().to_string()];
        if level.at_least(StealthLevel::Balanced) {
            scripts.push(Self::get_core_evasions().to_string());
            scripts.push(Self::get_canvas_evasions().to_string());
        }
        if level.at_least(StealthLevel::Maximum) {
            scripts.push(Self::get_webgl_evasions().to_string());
            scripts.push(Self::platform_override(&identity.platform));
        }
        scripts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> IdentityProfile {
        IdentityProfile {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) Chrome/131.0.0.0".to_string(),
            viewport: (1111, 777),
            platform: "Linux x86_64".to_string(),
            languages: vec!["en-US".to_string(), "en".to_string()],
        }
    }

    #[test]
    fn lightweight_args_carry_identity_and_detection_flags() {
        let args = build_stealth_arguments(StealthLevel::Lightweight, &identity(), true, None);
        assert!(args.contains(&"--disable-blink-features=AutomationControlled".to_string()));
        assert!(args.contains(&"--headless=new".to_string()));
        assert!(args.contains(&"--window-size=1111,777".to_string()));
        assert!(args.iter().any(|a| a.starts_with("--user-agent=Mozilla/5.0")));
        assert!(!args.iter().any(|a| a.starts_with("--proxy-server")));
        assert!(!args.contains(&"--disable-gpu".to_string()));
    }

    #[test]
    fn headed_sessions_omit_headless_flag() {
        let args = build_stealth_arguments(StealthLevel::Balanced, &identity(), false, None);
        assert!(!args.iter().any(|a| a.starts_with("--headless")));
        assert!(args.contains(&"--lang=en-US,en".to_string()));
    }

    #[test]
    fn proxy_and_maximum_flags() {
        let args = build_stealth_arguments(
            StealthLevel::Maximum,
            &identity(),
            true,
            Some("socks5://10.0.0.2:1080"),
        );
        assert!(args.contains(&"--proxy-server=socks5://10.0.0.2:1080".to_string()));
        assert!(args.contains(&"--disable-gpu".to_string()));
    }

    #[test]
    fn webdriver_flag_is_hidden_at_every_level() {
        for level in [
            StealthLevel::Lightweight,
            StealthLevel::Balanced,
            StealthLevel::Maximum,
        ] {
            let scripts = StealthScripts::for_level(level, &identity());
            assert!(scripts[0].contains("'webdriver'"));
        }
        assert_eq!(
            StealthScripts::for_level(StealthLevel::Lightweight, &identity()).len(),
            1
        );
    }

    #[test]
    fn platform_override_is_quoted() {
        let script = StealthScripts::platform_override("Win'32\"");
        assert!(script.contains(r#"get: () => "Win'32\"""#));
    }
}
