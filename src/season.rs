//! The 72 micro-seasons (七十二候) used for the daily seasonal card.
//!
//! Each entry covers an inclusive `MM-DD` range. Ranges are compared
//! lexically, which works because both sides are zero-padded. Exactly one
//! entry wraps across the year boundary; the table covers the leap day.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};

/// Seconds east of UTC for the civil calendar the page is written for.
pub const JST_OFFSET_SECS: i32 = 9 * 3600;

/// The fixed UTC+9 offset.
pub fn jst() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECS).expect("UTC+9 is a valid offset")
}

/// One micro-season.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonalEntry {
    /// First day, `MM-DD`.
    pub start: &'static str,
    /// Last day (inclusive), `MM-DD`.
    pub end: &'static str,
    /// The enclosing 24-term solar term (二十四節気).
    pub sekki: &'static str,
    pub name: &'static str,
    pub reading: &'static str,
    pub description: &'static str,
}

impl SeasonalEntry {
    /// Whether this entry's range contains the given `MM-DD`.
    pub fn contains(&self, month_day: &str) -> bool {
        if self.start <= self.end {
            self.start <= month_day && month_day <= self.end
        } else {
            month_day >= self.start || month_day <= self.end
        }
    }
}

const fn kou(
    start: &'static str,
    end: &'static str,
    sekki: &'static str,
    name: &'static str,
    reading: &'static str,
    description: &'static str,
) -> SeasonalEntry {
    SeasonalEntry { start, end, sekki, name, reading, description }
}

/// Ordered table, January first; the year-wrapping entry is last.
pub static SEASONS: [SeasonalEntry; 72] = [
    kou("01-05", "01-09", "小寒", "芹乃栄", "せりすなわちさかう", "芹が水辺で力強く育ち始める頃。七草がゆで新年の体を整えます"),
    kou("01-10", "01-14", "小寒", "水泉動", "しみずあたたかをふくむ", "地中で凍った泉の水がわずかに動き出す頃。春の気配が地の底から"),
    kou("01-15", "01-19", "小寒", "雉始雊", "きじはじめてなく", "雄の雉が鳴き始める頃。求愛の声が冬の野に響きます"),
    kou("01-20", "01-24", "大寒", "款冬華", "ふきのはなさく", "蕗の薹が雪の下からそっと顔を出す頃。春一番の便りです"),
    kou("01-25", "01-29", "大寒", "水沢腹堅", "さわみずこおりつめる", "沢の水が厚く張りつめて凍る頃。寒さの底ですが、光は日ごとに強く"),
    kou("01-30", "02-03", "大寒", "鶏始乳", "にわとりはじめてとやにつく", "鶏が卵を産み始める頃。春に向けて生命が動き出します"),
    kou("02-04", "02-08", "立春", "東風解凍", "はるかぜこおりをとく", "春風が吹いて、凍っていた川や地面の氷が少しずつ解け始める頃"),
    kou("02-09", "02-13", "立春", "黄鶯睍睆", "うぐいすなく", "鶯が山里で美しい声でさえずり始める頃。春の訪れを告げる声"),
    kou("02-14", "02-18", "立春", "魚上氷", "うおこおりをいずる", "氷が割れて、その隙間から魚が飛び跳ねる頃。水の中にも春が来ます"),
    kou("02-19", "02-23", "雨水", "土脉潤起", "つちのしょううるおいおこる", "雪が雨に変わり、土が潤い始める頃。大地が目を覚まします"),
    kou("02-24", "02-29", "雨水", "霞始靆", "かすみはじめてたなびく", "春霞がたなびき始める頃。遠くの景色がやわらかくにじみます"),
    kou("03-01", "03-05", "雨水", "草木萌動", "そうもくめばえいずる", "草や木の芽が膨らんで萌え始める頃。いよいよ春本番が近づきます"),
    kou("03-06", "03-10", "啓蟄", "蟄虫啓戸", "すごもりむしとをひらく", "冬ごもりの虫が土の中から出てくる頃。大地が目覚めます"),
    kou("03-11", "03-15", "啓蟄", "桃始笑", "ももはじめてさく", "桃の花がほころび始める頃。花が咲くことを「笑う」と表す美しい表現"),
    kou("03-16", "03-20", "啓蟄", "菜虫化蝶", "なむしちょうとなる", "青虫がさなぎから蝶へと生まれ変わる頃。春の変容です"),
    kou("03-21", "03-25", "春分", "雀始巣", "すずめはじめてすくう", "雀が巣を作り始める頃。春の陽気に誘われて"),
    kou("03-26", "03-30", "春分", "桜始開", "さくらはじめてひらく", "桜の花が咲き始める頃。日本の春の象徴です"),
    kou("03-31", "04-04", "春分", "雷乃発声", "かみなりすなわちこえをはっす", "春雷が鳴り始める頃。空気が冬から春へと入れ替わります"),
    kou("04-05", "04-09", "清明", "玄鳥至", "つばめきたる", "燕が南の国から渡ってくる頃。春の使者の到来です"),
    kou("04-10", "04-14", "清明", "鴻雁北", "こうがんきたへかえる", "雁が北へ帰っていく頃。秋に来た渡り鳥との別れの季節"),
    kou("04-15", "04-19", "清明", "虹始見", "にじはじめてあらわる", "春の雨上がりに虹が見え始める頃。空気が潤みます"),
    kou("04-20", "04-24", "穀雨", "葭始生", "あしはじめてしょうず", "葦が芽吹き始める頃。水辺に緑が戻ります"),
    kou("04-25", "04-29", "穀雨", "霜止出苗", "しもやんでなえいずる", "霜が降りなくなり、苗が育つ頃。田植えの準備が始まります"),
    kou("04-30", "05-05", "穀雨", "牡丹華", "ぼたんはなさく", "牡丹の花が咲く頃。百花の王と呼ばれる華やかさ"),
    kou("05-06", "05-10", "立夏", "蛙始鳴", "かわずはじめてなく", "蛙が鳴き始める頃。田んぼに元気な合唱が響きます"),
    kou("05-11", "05-15", "立夏", "蚯蚓出", "みみずいずる", "ミミズが地上に出てくる頃。大地の恵みを支える生きもの"),
    kou("05-16", "05-20", "立夏", "竹笋生", "たけのこしょうず", "筍が生えてくる頃。竹林に旬の味覚が実ります"),
    kou("05-21", "05-25", "小満", "蚕起食桑", "かいこおきてくわをはむ", "蚕が桑の葉を盛んに食べ始める頃"),
    kou("05-26", "05-30", "小満", "紅花栄", "べにばなさかう", "紅花が盛んに咲く頃。鮮やかな黄色が野に広がります"),
    kou("05-31", "06-05", "小満", "麦秋至", "むぎのときいたる", "麦が熟して収穫を迎える頃。初夏の黄金色"),
    kou("06-06", "06-10", "芒種", "螳螂生", "かまきりしょうず", "カマキリが生まれる頃。小さな命の営みが始まります"),
    kou("06-11", "06-15", "芒種", "腐草為蛍", "くされたるくさほたるとなる", "蛍が飛び始める頃。夜の水辺にやさしい光が灯ります"),
    kou("06-16", "06-20", "芒種", "梅子黄", "うめのみきばむ", "梅の実が黄色く色づく頃。梅雨の語源ともいわれます"),
    kou("06-21", "06-25", "夏至", "乃東枯", "なつかれくさかるる", "夏枯草が枯れ始める頃。夏至を過ぎ、陽はゆっくりと短くなります"),
    kou("06-26", "06-30", "夏至", "菖蒲華", "あやめはなさく", "菖蒲の花が咲く頃。雨に濡れた紫が美しい"),
    kou("07-01", "07-06", "夏至", "半夏生", "はんげしょうず", "半夏が生える頃。田植えを終える目安とされます"),
    kou("07-07", "07-11", "小暑", "温風至", "あつかぜいたる", "温かい風が吹き始める頃。本格的な夏の到来です"),
    kou("07-12", "07-16", "小暑", "蓮始開", "はすはじめてひらく", "蓮の花が開き始める頃。早朝の池に清らかな美しさ"),
    kou("07-17", "07-22", "小暑", "鷹乃学習", "たかすなわちわざをならう", "鷹の幼鳥が飛ぶことを覚える頃"),
    kou("07-23", "07-28", "大暑", "桐始結花", "きりはじめてはなをむすぶ", "桐の花が実を結び始める頃"),
    kou("07-29", "08-02", "大暑", "土潤溽暑", "つちうるおうてむしあつし", "土が湿り蒸し暑くなる頃。夏の暑さの盛りです"),
    kou("08-03", "08-07", "大暑", "大雨時行", "たいうときどきにふる", "時折大雨が降る頃。夕立が暑さを和らげます"),
    kou("08-08", "08-12", "立秋", "涼風至", "すずかぜいたる", "涼しい風が吹き始める頃。暦の上では秋の始まり"),
    kou("08-13", "08-17", "立秋", "寒蝉鳴", "ひぐらしなく", "ひぐらしが鳴き始める頃。夕暮れにもの悲しい声が響きます"),
    kou("08-18", "08-22", "立秋", "蒙霧升降", "ふかききりまとう", "深い霧が立ちこめる頃。朝晩にどこか秋の気配"),
    kou("08-23", "08-27", "処暑", "綿柎開", "わたのはなしべひらく", "綿の萼が開く頃。ふわふわの綿が顔を出します"),
    kou("08-28", "09-01", "処暑", "天地始粛", "てんちはじめてさむし", "暑さがようやく収まり始める頃。空が高くなります"),
    kou("09-02", "09-07", "処暑", "禾乃登", "こくものすなわちみのる", "稲が実る頃。田んぼが黄金色に色づきます"),
    kou("09-08", "09-12", "白露", "草露白", "くさのつゆしろし", "草に降りた露が白く光る頃。朝晩の冷え込みが増します"),
    kou("09-13", "09-17", "白露", "鶺鴒鳴", "せきれいなく", "鶺鴒が鳴き始める頃。秋の気配が色濃くなります"),
    kou("09-18", "09-22", "白露", "玄鳥去", "つばめさる", "燕が南へ帰っていく頃。春に来た使者との別れ"),
    kou("09-23", "09-27", "秋分", "雷乃収声", "かみなりすなわちこえをおさむ", "雷が鳴らなくなる頃。空気が澄み始めます"),
    kou("09-28", "10-02", "秋分", "蟄虫坏戸", "むしかくれてとをふさぐ", "虫が土の中に隠れて戸をふさぐ頃。冬支度の始まり"),
    kou("10-03", "10-07", "秋分", "水始涸", "みずはじめてかるる", "田の水を抜いて稲刈りの準備をする頃"),
    kou("10-08", "10-12", "寒露", "鴻雁来", "こうがんきたる", "雁が北から渡ってくる頃。秋の空に雁行の列"),
    kou("10-13", "10-17", "寒露", "菊花開", "きくのはなひらく", "菊の花が咲き始める頃。秋の彩りです"),
    kou("10-18", "10-22", "寒露", "蟋蟀在戸", "きりぎりすとにあり", "蟋蟀が戸口で鳴く頃。秋の夜長に虫の音が響きます"),
    kou("10-23", "10-27", "霜降", "霜始降", "しもはじめてふる", "霜が初めて降りる頃。冬の足音が近づきます"),
    kou("10-28", "11-01", "霜降", "霎時施", "こさめときどきふる", "小雨がしとしとと降る頃。晩秋の静かな雨"),
    kou("11-02", "11-06", "霜降", "楓蔦黄", "もみじつたきばむ", "紅葉や蔦が色づく頃。山が燃えるような美しさに"),
    kou("11-07", "11-11", "立冬", "山茶始開", "つばきはじめてひらく", "山茶花が咲き始める頃。冬の庭に彩りを添えます"),
    kou("11-12", "11-16", "立冬", "地始凍", "ちはじめてこおる", "大地が凍り始める頃。冬が本格的にやってきます"),
    kou("11-17", "11-21", "立冬", "金盞香", "きんせんかさく", "水仙の花が咲き始める頃。清楚な香りが漂います"),
    kou("11-22", "11-26", "小雪", "虹蔵不見", "にじかくれてみえず", "虹を見かけなくなる頃。冬の空気は乾いて澄んでいます"),
    kou("11-27", "12-01", "小雪", "朔風払葉", "きたかぜこのはをはらう", "北風が木の葉を吹き払う頃。冬枯れの景色"),
    kou("12-02", "12-06", "小雪", "橘始黄", "たちばなはじめてきばむ", "橘の実が黄色く色づき始める頃"),
    kou("12-07", "12-11", "大雪", "閉塞成冬", "そらさむくふゆとなる", "空が重く閉ざされ、本格的な冬が訪れる頃"),
    kou("12-12", "12-16", "大雪", "熊蟄穴", "くまあなにこもる", "熊が冬眠のために穴に入る頃。山も静かに眠りにつきます"),
    kou("12-17", "12-21", "大雪", "鱖魚群", "さけのうおむらがる", "鮭が群がって川を上る頃。命をつなぐ壮大な旅"),
    kou("12-22", "12-26", "冬至", "乃東生", "なつかれくさしょうず", "夏枯草が芽を出す頃。冬至を過ぎ、陽が少しずつ長くなります"),
    kou("12-27", "12-30", "冬至", "麋角解", "さわしかのつのおつる", "鹿の角が落ちる頃。新しい年への準備が始まります"),
    kou("12-31", "01-04", "冬至", "雪下出麦", "ゆきわたりてむぎのびる", "雪の下で麦が芽を出す頃。見えないところで春への準備"),
];

/// Returned when nothing matches. Unreachable with the table above.
static FALLBACK: SeasonalEntry = kou(
    "02-04",
    "02-08",
    "立春",
    "東風解凍",
    "はるかぜこおりをとく",
    "春風が吹いて氷が解け始める頃",
);

/// Look up the micro-season for a `MM-DD` string.
pub fn for_month_day(month_day: &str) -> &'static SeasonalEntry {
    SEASONS
        .iter()
        .find(|entry| entry.contains(month_day))
        .unwrap_or(&FALLBACK)
}

/// Look up the micro-season for a calendar date.
pub fn for_date(date: NaiveDate) -> &'static SeasonalEntry {
    for_month_day(&format!("{:02}-{:02}", date.month(), date.day()))
}

/// The micro-season for `now` in the UTC+9 civil calendar.
pub fn current(now: DateTime<Utc>) -> &'static SeasonalEntry {
    let today = now.with_timezone(&jst()).date_naive();
    let entry = for_date(today);
    tracing::debug!(%today, kou = entry.name, "Resolved micro-season");
    entry
}
