#![cfg(test)]

pub mod scenarios;
pub mod configured;
