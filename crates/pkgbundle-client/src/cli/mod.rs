/*
[INPUT]:  Parsed subcommand arguments, ClientSettings
[OUTPUT]: Non-interactive and wizard subcommands
[POS]:    CLI layer module root
[UPDATE]: When adding subcommands
*/

pub mod init;
pub mod submit;
pub mod tasks;
