use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub device: DeviceConfig,
    pub simulation: SimulationConfig,
    pub publishing: PublishingConfig,
    #[serde(default)]
    pub mqtt: MqttConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// Path to the base dataset JSON loaded once at startup.
    pub dataset_path: String,
    /// Device name stamped into every published message envelope.
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    /// Fixed RNG seed for reproducible runs; entropy-seeded when omitted.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Directory for periodic dataset dumps; dumps are disabled when omitted.
    #[serde(default)]
    pub dump_dir: Option<String>,
    #[serde(default = "default_dump_every_ticks")]
    pub dump_every_ticks: u64,
}

fn default_tick_interval_secs() -> u64 {
    10
}

fn default_dump_every_ticks() -> u64 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Max number of telemetry messages kept in the broadcast channel for
    /// /ws/telemetry (slow clients may lag).
    pub broadcast_capacity: usize,
    /// How often to log app stats (ticks, ws clients) at INFO level.
    pub stats_log_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MqttConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_mqtt_host")]
    pub host: String,
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
    #[serde(default = "default_mqtt_topic")]
    pub topic: String,
    #[serde(default = "default_mqtt_client_id")]
    pub client_id: String,
    /// Fixed delay before re-polling the broker after a connection failure.
    #[serde(default = "default_reconnect_secs")]
    pub reconnect_secs: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_mqtt_host(),
            port: default_mqtt_port(),
            topic: default_mqtt_topic(),
            client_id: default_mqtt_client_id(),
            reconnect_secs: default_reconnect_secs(),
        }
    }
}

fn default_mqtt_host() -> String {
    "localhost".into()
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_mqtt_topic() -> String {
    "telemetry/snapshots".into()
}

fn default_mqtt_client_id() -> String {
    "netprobe-sim".into()
}

fn default_reconnect_secs() -> u64 {
    5
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.device.dataset_path.is_empty(),
            "device.dataset_path must be non-empty"
        );
        anyhow::ensure!(!self.device.name.is_empty(), "device.name must be non-empty");
        anyhow::ensure!(
            self.simulation.tick_interval_secs > 0,
            "simulation.tick_interval_secs must be > 0, got {}",
            self.simulation.tick_interval_secs
        );
        anyhow::ensure!(
            self.simulation.dump_every_ticks > 0,
            "simulation.dump_every_ticks must be > 0, got {}",
            self.simulation.dump_every_ticks
        );
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        anyhow::ensure!(
            self.publishing.stats_log_interval_secs > 0,
            "publishing.stats_log_interval_secs must be > 0, got {}",
            self.publishing.stats_log_interval_secs
        );
        if self.mqtt.enabled {
            anyhow::ensure!(!self.mqtt.host.is_empty(), "mqtt.host must be non-empty");
            anyhow::ensure!(!self.mqtt.topic.is_empty(), "mqtt.topic must be non-empty");
            anyhow::ensure!(
                self.mqtt.reconnect_secs > 0,
                "mqtt.reconnect_secs must be > 0, got {}",
                self.mqtt.reconnect_secs
            );
        }
        Ok(())
    }
}
