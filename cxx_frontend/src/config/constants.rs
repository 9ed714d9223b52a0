pub mod compile_time {
    pub mod file_processing {
        /// Maximum source file size accepted by front-ends (16MB)
        /// SECURITY: Prevents memory exhaustion via huge translation units
        pub const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

        /// File extensions treated as C/C++ sources when walking directories
        pub const SOURCE_EXTENSIONS: &[&str] = &[
            "c", "cc", "cpp", "cxx", "c++", "h", "hh", "hpp", "hxx", "h++", "inl", "ipp",
        ];
    }

    pub mod lexical {
        /// Maximum identifier length
        /// SECURITY: Prevents pathological identifiers from generated code
        pub const MAX_IDENTIFIER_LENGTH: usize = 1024;

        /// Maximum number of tokens produced for a single input
        /// SECURITY: Prevents DoS via token explosion
        pub const MAX_TOKEN_COUNT: usize = 5_000_000;
    }

    pub mod preprocessor {
        /// Maximum number of registered defines and macros
        /// RESOURCE: Every source token is offered to every filter
        pub const MAX_FILTERS: usize = 10_000;

        /// Maximum number of tokens discarded as one macro argument list
        /// SECURITY: Bounds the damage of a missing closing parenthesis
        pub const MAX_MACRO_ARGUMENT_TOKENS: usize = 100_000;
    }

    pub mod scope {
        /// Maximum nesting depth of namespaces/classes
        /// SECURITY: Bounds recursive qualified-name lookup
        pub const MAX_SCOPE_DEPTH: usize = 256;
    }

    pub mod logging {
        /// Log buffer size for the in-memory logger
        /// RESOURCE: Controls memory usage for logging
        pub const LOG_BUFFER_SIZE: usize = 10_000;

        /// Maximum log message length before truncation
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 10_000;
    }
}
