//! End-to-end scenario tests for redit.
