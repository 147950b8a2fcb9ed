//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Plaza Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[server]
# host = "0.0.0.0"
# port = 1666

[world]
# width = 4800.0
# height = 3600.0
# participant_size = 48.0      # footprint edge length
# spawn_margin = 20.0
# max_participants = 50        # 1-10000
# name_max_length = 15         # 1-64
# capacity_counts_offline = false
# variants = ["#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4"]

[retention]
# offline_ttl_secs = 14400     # must be at least 10x sweep_interval_secs
# sweep_interval_secs = 60

[persistence]
# enabled = true
# snapshot_interval_secs = 300
# path = "/var/lib/plaza/offline_participants.json"
# backup_path = "/var/lib/plaza/offline_participants.backup.json"

[logging]
# log_connections = true
# log_movement = false
"##
    .to_string()
}
