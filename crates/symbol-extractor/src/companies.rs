/// Company name to ticker mapping for the most commonly covered stocks.
/// Matching is case-insensitive on word boundaries.
pub const COMPANY_TO_TICKER: &[(&str, &str)] = &[
    // Tech giants
    ("apple", "AAPL"),
    ("microsoft", "MSFT"),
    ("google", "GOOGL"),
    ("alphabet", "GOOGL"),
    ("amazon", "AMZN"),
    ("meta", "META"),
    ("facebook", "META"),
    ("tesla", "TSLA"),
    ("nvidia", "NVDA"),
    ("netflix", "NFLX"),
    // Other tech
    ("amd", "AMD"),
    ("intel", "INTC"),
    ("qualcomm", "QCOM"),
    ("broadcom", "AVGO"),
    ("oracle", "ORCL"),
    ("salesforce", "CRM"),
    ("adobe", "ADBE"),
    ("servicenow", "NOW"),
    ("snowflake", "SNOW"),
    ("palantir", "PLTR"),
    ("airbnb", "ABNB"),
    ("uber", "UBER"),
    ("lyft", "LYFT"),
    ("doordash", "DASH"),
    // Finance
    ("jpmorgan", "JPM"),
    ("jp morgan", "JPM"),
    ("goldman sachs", "GS"),
    ("morgan stanley", "MS"),
    ("bank of america", "BAC"),
    ("wells fargo", "WFC"),
    ("citigroup", "C"),
    ("coinbase", "COIN"),
    ("robinhood", "HOOD"),
    ("square", "SQ"),
    ("block", "SQ"),
    ("paypal", "PYPL"),
    ("visa", "V"),
    ("mastercard", "MA"),
    // Retail and consumer
    ("walmart", "WMT"),
    ("target", "TGT"),
    ("costco", "COST"),
    ("home depot", "HD"),
    ("lowe's", "LOW"),
    ("nike", "NKE"),
    ("starbucks", "SBUX"),
    ("mcdonald's", "MCD"),
    ("chipotle", "CMG"),
    ("shopify", "SHOP"),
    // Healthcare and pharma
    ("pfizer", "PFE"),
    ("moderna", "MRNA"),
    ("johnson & johnson", "JNJ"),
    ("merck", "MRK"),
    ("abbvie", "ABBV"),
    ("eli lilly", "LLY"),
    ("unitedhealth", "UNH"),
    // Energy
    ("exxon", "XOM"),
    ("chevron", "CVX"),
    ("conocophillips", "COP"),
    ("schlumberger", "SLB"),
    // Entertainment
    ("disney", "DIS"),
    ("comcast", "CMCSA"),
    ("warner bros", "WBD"),
    ("paramount", "PARA"),
    ("spotify", "SPOT"),
    // Automotive
    ("ford", "F"),
    ("general motors", "GM"),
    ("gm", "GM"),
    ("lucid", "LCID"),
    ("rivian", "RIVN"),
    ("nio", "NIO"),
    // Aerospace
    ("boeing", "BA"),
    ("lockheed martin", "LMT"),
    ("raytheon", "RTX"),
    // Indices, kept for market-context stories
    ("s&p 500", "SPY"),
    ("s&p", "SPY"),
    ("nasdaq", "QQQ"),
    ("dow jones", "DIA"),
    ("dow", "DIA"),
];

/// Uppercase words that look like tickers but are not
pub const EXCLUDED_WORDS: &[&str] = &[
    "CEO", "CFO", "CTO", "NYSE", "NASDAQ", "USD", "USA", "SEC", "FDA", "FTC", "IPO", "ETF", "API",
    "AI", "ML", "Q1", "Q2", "Q3", "Q4", "YOY", "MOM", "EBITDA", "PE", "EPS", "GDP", "CPI", "PPI",
    "FOMC", "FED", "DOJ", "FBI", "REIT", "SPAC", "ARKK", "VIX", "DXY", "BTC", "ETH", "THE", "AND",
    "FOR", "ARE", "BUT", "NOT", "YOU", "ALL", "CAN", "HER", "WAS", "ONE", "OUR", "OUT", "DAY",
    "GET", "HAS", "HIM", "HIS", "HOW", "ITS", "MAY", "NEW", "NOW", "OLD", "SEE", "TWO", "WAY",
    "WHO", "BOY", "DID", "LET", "PUT", "SAY", "SHE", "TOO", "USE", "DAD", "BIG", "FUN", "SIR",
    "YES",
];
