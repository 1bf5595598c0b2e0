//! Dungeon options and configuration
//!
//! Tunables for respawn, ambushes, depth limits and traps, loaded from a
//! run-control file of `OPTIONS=` lines.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{AMBUSH_PERCENT, DESCENT_LEAD, MAX_DUNGEON_LEVEL, RESPAWN_HOURS};

/// User-configurable dungeon options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonOptions {
    /// Hours away before a floor's monsters return
    pub respawn_hours: i64,
    /// Ambush chance (percent) on entering a room with live monsters
    pub ambush_percent: u32,
    /// Deepest floor of the dungeon
    pub max_dungeon_level: u32,
    /// Levels below the explorer's own level they may descend to
    pub descent_lead: u32,
    /// Whether agility can dodge a trap
    pub trap_evasion: bool,
}

impl Default for DungeonOptions {
    fn default() -> Self {
        Self {
            respawn_hours: RESPAWN_HOURS,
            ambush_percent: AMBUSH_PERCENT,
            max_dungeon_level: MAX_DUNGEON_LEVEL,
            descent_lead: DESCENT_LEAD,
            trap_evasion: true,
        }
    }
}

/// Options parsing error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Unknown option: {0}")]
    UnknownOption(String),
    #[error("Invalid value '{1}' for option '{0}'")]
    InvalidValue(String, String),
    #[error("Missing value for option '{0}'")]
    MissingValue(String),
}

impl DungeonOptions {
    /// Deepest floor an explorer of `explorer_level` may descend to
    pub fn descent_cap(&self, explorer_level: u32) -> u32 {
        self.max_dungeon_level
            .min(explorer_level.saturating_add(self.descent_lead))
            .max(1)
    }

    /// Load options from a file
    pub fn load_from_file(path: &Path) -> Result<Self, OptionsError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| OptionsError::IoError(e.to_string()))?;

        Self::parse_config(&contents)
    }

    /// Parse options from a config string
    pub fn parse_config(contents: &str) -> Result<Self, OptionsError> {
        let mut options = Self::default();

        for line in contents.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(opts) = line.strip_prefix("OPTIONS=") {
                for opt in opts.split(',') {
                    options.parse_option(opt.trim())?;
                }
            }
        }

        Ok(options)
    }

    fn parse_option(&mut self, opt: &str) -> Result<(), OptionsError> {
        if opt.is_empty() {
            return Ok(());
        }

        if let Some((key, value)) = opt.split_once(':').or_else(|| opt.split_once('=')) {
            return self.set_option(key.trim(), value.trim());
        }

        let (negated, name) = match opt.strip_prefix('!') {
            Some(name) => (true, name),
            None => (false, opt),
        };
        self.set_bool_option(name, !negated)
    }

    fn set_bool_option(&mut self, name: &str, value: bool) -> Result<(), OptionsError> {
        match name {
            "trap_evasion" => self.trap_evasion = value,
            "respawn_hours" | "ambush_percent" | "max_dungeon_level" | "descent_lead" => {
                return Err(OptionsError::MissingValue(name.to_string()));
            }
            _ => return Err(OptionsError::UnknownOption(name.to_string())),
        }
        Ok(())
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), OptionsError> {
        let invalid = || OptionsError::InvalidValue(name.to_string(), value.to_string());
        match name {
            "respawn_hours" => {
                self.respawn_hours = value.parse().map_err(|_| invalid())?;
                if self.respawn_hours < 0 {
                    return Err(invalid());
                }
            }
            "ambush_percent" => {
                self.ambush_percent = value.parse().map_err(|_| invalid())?;
                if self.ambush_percent > 100 {
                    return Err(invalid());
                }
            }
            "max_dungeon_level" => {
                self.max_dungeon_level = value.parse().map_err(|_| invalid())?;
                if self.max_dungeon_level == 0 {
                    return Err(invalid());
                }
            }
            "descent_lead" => self.descent_lead = value.parse().map_err(|_| invalid())?,
            "trap_evasion" => {
                self.trap_evasion = match value {
                    "true" | "yes" | "on" => true,
                    "false" | "no" | "off" => false,
                    _ => return Err(invalid()),
                }
            }
            _ => return Err(OptionsError::UnknownOption(name.to_string())),
        }
        Ok(())
    }

    /// Render options back into config file form
    pub fn to_config_string(&self) -> String {
        let mut out = String::from("# Delve options\n");
        out.push_str(&format!(
            "OPTIONS=respawn_hours:{},ambush_percent:{},max_dungeon_level:{},descent_lead:{}\n",
            self.respawn_hours, self.ambush_percent, self.max_dungeon_level, self.descent_lead
        ));
        out.push_str(if self.trap_evasion {
            "OPTIONS=trap_evasion\n"
        } else {
            "OPTIONS=!trap_evasion\n"
        });
        out
    }

    /// Save options to a file
    pub fn save_to_file(&self, path: &Path) -> Result<(), OptionsError> {
        std::fs::write(path, self.to_config_string())
            .map_err(|e| OptionsError::IoError(e.to_string()))
    }
}
