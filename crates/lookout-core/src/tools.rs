//! Fixed tool catalogue.
//!
//! All lookups take normalized names (see [`ToolName`]). A name that appears
//! in none of the sets is an ordinary tool: not file-producing, not a
//! delivery-class action, not technical.

use crate::types::ToolName;

pub const CREATE_FILE: &str = "create-file";
pub const FULL_FILE_REWRITE: &str = "full-file-rewrite";
pub const EDIT_FILE: &str = "edit-file";
pub const STR_REPLACE: &str = "str-replace";
pub const CREATE_SLIDE: &str = "create-slide";
pub const VALIDATE_SLIDE: &str = "validate-slide";

pub const DEPLOY: &str = "deploy";
pub const EXPOSE_PORT: &str = "expose-port";

pub const CREATE_CREDENTIAL_PROFILE: &str = "create-credential-profile";
pub const CONNECT_SERVICE: &str = "connect-service";
pub const CONFIGURE_INTEGRATION: &str = "configure-integration";

pub const EXECUTE_COMMAND: &str = "execute-command";
pub const READ_FILE: &str = "read-file";
pub const CHECK_COMMAND_OUTPUT: &str = "check-command-output";
pub const TERMINATE_COMMAND: &str = "terminate-command";
pub const ASK: &str = "ask";
pub const COMPLETE: &str = "complete";

/// Tools whose call payload names a file they write.
pub const FILE_PRODUCING: &[&str] = &[
    CREATE_FILE,
    FULL_FILE_REWRITE,
    EDIT_FILE,
    STR_REPLACE,
    CREATE_SLIDE,
    VALIDATE_SLIDE,
];

/// Externally observable publish actions.
pub const DEPLOYMENT: &[&str] = &[DEPLOY, EXPOSE_PORT];

/// Credential and connection setup.
pub const CREDENTIAL: &[&str] = &[
    CREATE_CREDENTIAL_PROFILE,
    CONNECT_SERVICE,
    CONFIGURE_INTEGRATION,
];

/// Routine steps the navigator may skip over.
pub const TECHNICAL: &[&str] = &[
    EXECUTE_COMMAND,
    STR_REPLACE,
    EDIT_FILE,
    READ_FILE,
    CHECK_COMMAND_OUTPUT,
    TERMINATE_COMMAND,
    ASK,
    COMPLETE,
];

pub fn is_file_producing(name: &ToolName) -> bool {
    FILE_PRODUCING.contains(&name.as_str())
}

pub fn is_deployment(name: &ToolName) -> bool {
    DEPLOYMENT.contains(&name.as_str())
}

pub fn is_credential(name: &ToolName) -> bool {
    CREDENTIAL.contains(&name.as_str())
}

pub fn is_technical(name: &ToolName) -> bool {
    TECHNICAL.contains(&name.as_str())
}

pub fn is_complete_action(name: &ToolName) -> bool {
    name.as_str() == COMPLETE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_lookups_use_normalized_names() {
        assert!(is_file_producing(&ToolName::new("Create_File")));
        assert!(is_deployment(&ToolName::new("expose_port")));
        assert!(is_credential(&ToolName::new("connect-service")));
        assert!(is_technical(&ToolName::new("Execute Command")));
        assert!(is_complete_action(&ToolName::new("COMPLETE")));
    }

    #[test]
    fn edits_are_both_file_producing_and_technical() {
        let edit = ToolName::new("edit-file");
        assert!(is_file_producing(&edit));
        assert!(is_technical(&edit));
        let create = ToolName::new("create-file");
        assert!(!is_technical(&create));
    }

    #[test]
    fn unknown_tool_is_in_no_set() {
        let name = ToolName::new("browser-navigate");
        assert!(!is_file_producing(&name));
        assert!(!is_deployment(&name));
        assert!(!is_credential(&name));
        assert!(!is_technical(&name));
    }
}
