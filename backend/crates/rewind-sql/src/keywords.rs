//! Reserved-word tables used to decide when a column name must be quoted.
//!
//! Only words a store refuses as a bare identifier are listed; non-reserved
//! keywords (`NAME`, `VALUE`, `STATUS` ...) stay unquoted so generated text
//! matches what a developer would write by hand.

use std::str::FromStr;

const MYSQL_RESERVED: &[&str] = &[
    "ACCESSIBLE", "ADD", "ALL", "ALTER", "ANALYZE", "AND", "AS", "ASC", "BEFORE", "BETWEEN",
    "BIGINT", "BINARY", "BLOB", "BOTH", "BY", "CALL", "CASCADE", "CASE", "CHANGE", "CHAR",
    "CHARACTER", "CHECK", "COLLATE", "COLUMN", "CONDITION", "CONSTRAINT", "CONTINUE", "CONVERT",
    "CREATE", "CROSS", "CUBE", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP",
    "CURRENT_USER", "CURSOR", "DATABASE", "DATABASES", "DEC", "DECIMAL", "DECLARE", "DEFAULT",
    "DELAYED", "DELETE", "DESC", "DESCRIBE", "DISTINCT", "DIV", "DOUBLE", "DROP", "DUAL", "EACH",
    "ELSE", "ELSEIF", "EXISTS", "EXIT", "EXPLAIN", "FALSE", "FETCH", "FLOAT", "FOR", "FORCE",
    "FOREIGN", "FROM", "FULLTEXT", "FUNCTION", "GENERATED", "GET", "GRANT", "GROUP", "GROUPS",
    "HAVING", "IF", "IGNORE", "IN", "INDEX", "INNER", "INSERT", "INT", "INTEGER", "INTERVAL",
    "INTO", "IS", "ITERATE", "JOIN", "KEY", "KEYS", "KILL", "LEADING", "LEAVE", "LEFT", "LIKE",
    "LIMIT", "LINES", "LOAD", "LOCK", "LONG", "LOOP", "MATCH", "NATURAL", "NOT", "NULL",
    "NUMERIC", "OF", "ON", "OPTION", "OR", "ORDER", "OUT", "OUTER", "OVER", "PARTITION",
    "PRECISION", "PRIMARY", "PROCEDURE", "RANGE", "RANK", "READ", "REAL", "REFERENCES", "REGEXP",
    "RELEASE", "RENAME", "REPEAT", "REPLACE", "REQUIRE", "RESTRICT", "RETURN", "REVOKE", "RIGHT",
    "RLIKE", "ROW", "ROWS", "SCHEMA", "SELECT", "SET", "SHOW", "SMALLINT", "SPATIAL", "SQL",
    "STARTING", "TABLE", "THEN", "TO", "TRAILING", "TRIGGER", "TRUE", "UNDO", "UNION", "UNIQUE",
    "UNLOCK", "UNSIGNED", "UPDATE", "USAGE", "USE", "USING", "VALUES", "VARCHAR", "VARYING",
    "WHEN", "WHERE", "WHILE", "WINDOW", "WITH", "WRITE", "XOR", "ZEROFILL",
];

const POSTGRESQL_RESERVED: &[&str] = &[
    "ALL", "ANALYSE", "ANALYZE", "AND", "ANY", "ARRAY", "AS", "ASC", "ASYMMETRIC",
    "AUTHORIZATION", "BINARY", "BOTH", "CASE", "CAST", "CHECK", "COLLATE", "COLUMN",
    "CONCURRENTLY", "CONSTRAINT", "CREATE", "CROSS", "CURRENT_CATALOG", "CURRENT_DATE",
    "CURRENT_ROLE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER", "DEFAULT", "DEFERRABLE",
    "DESC", "DISTINCT", "DO", "ELSE", "END", "EXCEPT", "FALSE", "FETCH", "FOR", "FOREIGN",
    "FREEZE", "FROM", "FULL", "GRANT", "GROUP", "HAVING", "ILIKE", "IN", "INITIALLY", "INNER",
    "INTERSECT", "INTO", "IS", "ISNULL", "JOIN", "LATERAL", "LEADING", "LEFT", "LIKE", "LIMIT",
    "LOCALTIME", "LOCALTIMESTAMP", "NATURAL", "NOT", "NOTNULL", "NULL", "OFFSET", "ON", "ONLY",
    "OR", "ORDER", "OUTER", "OVERLAPS", "PLACING", "PRIMARY", "REFERENCES", "RETURNING", "RIGHT",
    "SELECT", "SESSION_USER", "SIMILAR", "SOME", "SYMMETRIC", "TABLE", "TABLESAMPLE", "THEN",
    "TO", "TRAILING", "TRUE", "UNION", "UNIQUE", "USER", "USING", "VARIADIC", "VERBOSE", "WHEN",
    "WHERE", "WINDOW", "WITH",
];

const DB2_RESERVED: &[&str] = &[
    "ADD", "AFTER", "ALL", "ALLOCATE", "ALLOW", "ALTER", "AND", "ANY", "AS", "ASENSITIVE",
    "ASSOCIATE", "ASUTIME", "AT", "AUDIT", "AUX", "AUXILIARY", "BEFORE", "BEGIN", "BETWEEN",
    "BUFFERPOOL", "BY", "CALL", "CAPTURE", "CASCADED", "CASE", "CAST", "CCSID", "CHAR",
    "CHARACTER", "CHECK", "CLONE", "CLOSE", "CLUSTER", "COLLECTION", "COLLID", "COLUMN",
    "COMMENT", "COMMIT", "CONCAT", "CONDITION", "CONNECT", "CONNECTION", "CONSTRAINT", "CONTAINS",
    "CONTINUE", "CREATE", "CURRENT", "CURRENT_DATE", "CURRENT_PATH", "CURRENT_SCHEMA",
    "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURSOR", "DATA", "DATABASE", "DAY", "DAYS", "DECLARE",
    "DEFAULT", "DELETE", "DESCRIPTOR", "DETERMINISTIC", "DISABLE", "DISALLOW", "DISTINCT", "DO",
    "DOUBLE", "DROP", "DYNAMIC", "ELSE", "ELSEIF", "ENCODING", "END", "ENDING", "ESCAPE",
    "EXCEPT", "EXCEPTION", "EXECUTE", "EXISTS", "EXIT", "EXPLAIN", "EXTERNAL", "FENCED", "FETCH",
    "FINAL", "FOR", "FREE", "FROM", "FULL", "FUNCTION", "GENERATED", "GET", "GLOBAL", "GO",
    "GOTO", "GRANT", "GROUP", "HANDLER", "HAVING", "HOLD", "HOUR", "HOURS", "IF", "IMMEDIATE",
    "IN", "INCLUSIVE", "INDEX", "INNER", "INOUT", "INSENSITIVE", "INSERT", "INTERSECT", "INTO",
    "IS", "ITERATE", "JOIN", "KEY", "LABEL", "LANGUAGE", "LC_CTYPE", "LEAVE", "LEFT", "LIKE",
    "LOCAL", "LOCALE", "LOCATOR", "LOCATORS", "LOCK", "LOCKMAX", "LOCKSIZE", "LONG", "LOOP",
    "MICROSECOND", "MICROSECONDS", "MINUTE", "MINUTES", "MODIFIES", "MONTH", "MONTHS", "NEXTVAL",
    "NO", "NONE", "NOT", "NULL", "NULLS", "OF", "OLD", "ON", "OPEN", "OPTIMIZATION", "OPTIMIZE",
    "OR", "ORDER", "OUT", "OUTER", "PACKAGE", "PARAMETER", "PART", "PARTITION", "PATH", "PERIOD",
    "PLAN", "PRECISION", "PREPARE", "PREVVAL", "PRIQTY", "PRIVILEGES", "PROCEDURE", "PROGRAM",
    "PUBLIC", "QUERY", "READS", "REFERENCES", "REFRESH", "RELEASE", "RENAME", "REPEAT",
    "RESIGNAL", "RESTRICT", "RESULT", "RETURN", "RETURNS", "REVOKE", "RIGHT", "ROLE", "ROLLBACK",
    "ROW", "ROWSET", "RUN", "SAVEPOINT", "SCHEMA", "SECOND", "SECONDS", "SECURITY", "SELECT",
    "SENSITIVE", "SEQUENCE", "SESSION_USER", "SET", "SIGNAL", "SIMPLE", "SOME", "SOURCE",
    "SPECIFIC", "STANDARD", "STATEMENT", "STATIC", "SUMMARY", "SYNONYM", "SYSDATE",
    "SYSTIMESTAMP", "TABLE", "TABLESPACE", "THEN", "TO", "TRIGGER", "TRUNCATE", "TYPE", "UNDO",
    "UNION", "UNIQUE", "UNTIL", "UPDATE", "USER", "USING", "VALUE", "VALUES", "VARIABLE",
    "VARIANT", "VIEW", "VOLATILE", "WHEN", "WHENEVER", "WHERE", "WHILE", "WITH", "YEAR", "YEARS",
    "ZONE",
];

/// Reserved-word table of one database product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordSet {
    MySql,
    PostgreSql,
    Db2,
}

impl KeywordSet {
    fn words(self) -> &'static [&'static str] {
        match self {
            KeywordSet::MySql => MYSQL_RESERVED,
            KeywordSet::PostgreSql => POSTGRESQL_RESERVED,
            KeywordSet::Db2 => DB2_RESERVED,
        }
    }

    /// Case-insensitive reserved-word check.
    pub fn is_reserved(self, word: &str) -> bool {
        self.words().iter().any(|k| k.eq_ignore_ascii_case(word))
    }
}

impl FromStr for KeywordSet {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(KeywordSet::MySql),
            "postgresql" | "postgres" => Ok(KeywordSet::PostgreSql),
            "db2" => Ok(KeywordSet::Db2),
            _ => Err(()),
        }
    }
}
