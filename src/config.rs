use crate::{cameras::Facing, error::Error, nav::ScanTarget};
use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

macro_rules! def_cfg {
    ($(
        $struct_ident:ident {
            $(
            $(# [ $attr:ident $( ( $tt:tt ) )* ])?
            $ident:ident : $ty:ty ,
            )*
        }
    )*) => {
       $(
           #[derive(Deserialize, Serialize, Debug, Clone)]
           pub struct $struct_ident {
               $(
                $(#[$attr $( ($tt) )?])?
                pub $ident: $ty,
               )*
           }
       )*
    };
}

def_cfg! {
    Config {
        server: ServerConfig,
        camera: CameraConfig,
        scan: ScanConfig,
    }
    ServerConfig {
        port: u16,
    }
    CameraConfig {
        facing: Facing,
        name: Option<String>,
        settings: Option<CameraSettings>,
    }
    CameraSettings {
        width: u32,
        height: u32,
        frame_rate: CfgFraction,
    }
    CfgFraction {
        num: u32,
        den: u32,
    }
    ScanConfig {
        path: String,
        param: String,
        refresh_rate: CfgFraction,
    }
}

impl Config {
    /// Load the configuration from the specified path
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let mut f = File::open(path).map_err(|_| Error::FailedToReadConfig)?;
        let mut buf = String::new();
        f.read_to_string(&mut buf)
            .map_err(|_| Error::FailedToReadConfig)?;
        toml::from_str(&buf).map_err(|_| Error::InvalidConfig)
    }

    /// Save the configuration to the specified path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let mut f = File::create(path).map_err(|_| Error::FailedToWriteConfig)?;
        let toml_cfgg = toml::to_string_pretty(&self).map_err(|_| Error::InvalidConfig)?;
        f.write_all(toml_cfgg.as_bytes())
            .map_err(|_| Error::FailedToWriteConfig)?;
        f.flush().map_err(|_| Error::FailedToWriteConfig)?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            camera: CameraConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8642 }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing: Facing::Environment,
            name: None,
            settings: None,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            path: String::from("/scan/"),
            param: String::from("code"),
            refresh_rate: CfgFraction { num: 60, den: 1 },
        }
    }
}

impl ScanConfig {
    /// The navigation target scans redirect to
    pub fn target(&self) -> ScanTarget {
        ScanTarget::new(&self.path, &self.param)
    }
}

impl CfgFraction {
    pub fn approx(&self) -> f64 {
        if self.den == 0 {
            0.0
        } else {
            self.num as f64 / self.den as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.scan.path, "/scan/");
        assert_eq!(config.scan.param, "code");
        assert_eq!(config.scan.refresh_rate.approx(), 60.0);
        assert_eq!(config.camera.facing, Facing::Environment);
    }

    #[test]
    fn parse_full() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [camera]
            facing = "user"
            name = "Integrated Camera"

            [camera.settings]
            width = 1280
            height = 720
            frame_rate = { num = 30, den = 1 }

            [scan]
            path = "/scan/"
            param = "code"
            refresh_rate = { num = 60, den = 1 }
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.camera.facing, Facing::User);
        let settings = config.camera.settings.unwrap();
        assert_eq!((settings.width, settings.height), (1280, 720));
    }

    #[test]
    fn reject_garbage() {
        assert!(matches!(
            Config::load("/nonexistent/stocklens.toml"),
            Err(Error::FailedToReadConfig)
        ));
        let parsed: Result<Config, _> = toml::from_str("server = 3");
        assert!(parsed.is_err());
    }
}
