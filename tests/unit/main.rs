mod cli_command_parse_tests;
mod config_tests;
mod corpus_tests;
mod matcher_tests;
