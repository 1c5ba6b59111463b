mod cli;
mod helpers;
mod inverted_index;
mod spec;
